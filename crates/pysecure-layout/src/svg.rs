use crate::{Layout, Viewport};

const NODE_RADIUS: f64 = 12.0;
const LINK_COLOR: &str = "#cbd5e1";

/// Escape text for XML and HTML content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render one layout frame as a standalone SVG document.
pub fn render(layout: &Layout, viewport: &Viewport) -> String {
    let mut out = String::with_capacity(256 + layout.nodes.len() * 160);

    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = viewport.width,
        h = viewport.height
    ));

    out.push_str("  <g class=\"links\">\n");
    for e in &layout.edges {
        out.push_str(&format!(
            "    <line class=\"map-link\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            e.x1, e.y1, e.x2, e.y2, LINK_COLOR
        ));
    }
    out.push_str("  </g>\n");

    out.push_str("  <g class=\"nodes\">\n");
    for n in &layout.nodes {
        out.push_str(&format!(
            "    <g data-id=\"{}\" transform=\"translate({:.1},{:.1})\">\
<circle class=\"map-node\" r=\"{}\" fill=\"{}\"/>\
<text class=\"map-text\" dx=\"18\" dy=\"5\">{}</text></g>\n",
            escape(&n.id),
            n.x,
            n.y,
            NODE_RADIUS,
            n.node_type.color(),
            escape(&n.label)
        ));
    }
    out.push_str("  </g>\n</svg>\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settle;
    use pysecure_core::{Graph, GraphLink, GraphNode, NodeType};

    fn scenario() -> Graph {
        Graph {
            nodes: vec![
                GraphNode {
                    id: "a".into(),
                    label: "main.py".into(),
                    node_type: NodeType::File,
                },
                GraphNode {
                    id: "b".into(),
                    label: "Hash <SHA-256>".into(),
                    node_type: NodeType::Security,
                },
            ],
            links: vec![
                GraphLink {
                    source: "a".into(),
                    target: "b".into(),
                },
                GraphLink {
                    source: "a".into(),
                    target: "c".into(),
                },
            ],
        }
    }

    #[test]
    fn test_renders_valid_parts_of_dangling_graph() {
        let viewport = Viewport::default();
        let svg = render(&settle(&scenario(), viewport), &viewport);

        assert_eq!(svg.matches("<line ").count(), 1);
        assert_eq!(svg.matches("<circle ").count(), 2);
        assert!(svg.contains("data-id=\"a\""));
        assert!(svg.contains("data-id=\"b\""));
        assert!(!svg.contains("data-id=\"c\""));
    }

    #[test]
    fn test_colors_follow_node_type() {
        let viewport = Viewport::default();
        let svg = render(&settle(&scenario(), viewport), &viewport);
        assert!(svg.contains("fill=\"#3b82f6\""));
        assert!(svg.contains("fill=\"#ef4444\""));
    }

    #[test]
    fn test_labels_are_escaped() {
        let viewport = Viewport::default();
        let svg = render(&settle(&scenario(), viewport), &viewport);
        assert!(svg.contains("Hash &lt;SHA-256&gt;"));
        assert!(!svg.contains("<SHA-256>"));
    }

    #[test]
    fn test_escape_covers_markup_and_quotes() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_empty_layout_is_still_a_document() {
        let svg = render(&Layout::default(), &Viewport::new(100.0, 50.0));
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
