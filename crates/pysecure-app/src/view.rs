//! Projections of the shell state for display.
//!
//! Each `*_view` function is pure; the `render_*` helpers turn a projection
//! into plain text for the terminal.

use std::fmt::Write as _;

use serde::Serialize;

use pysecure_core::{NodeType, ProjectBundle};
use pysecure_layout::{settle, svg, Layout, Viewport};

use crate::shell::{Screen, Shell, Tab};

pub const TITLE: &str = "PySecure Login";
pub const SUBTITLE: &str =
    "Sistema de autenticação modular em Python com hashing SHA-256 e interface moderna.";
pub const START_LABEL: &str = "Iniciar Geração do Sistema";
pub const GENERATING_LABEL: &str = "Construindo Módulos de Segurança...";
pub const INFO_LABEL: &str = "Ver Informações do Programa";
pub const REGENERATE_LABEL: &str = "Regerar Código";

const COPIED: &str = "Copiado!";
const COPY: &str = "Copiar";

// --- Code tab ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeCard {
    pub index: usize,
    pub filename: String,
    pub caption: String,
    pub content: String,
    pub copied: bool,
}

impl CodeCard {
    pub fn button_label(&self) -> &'static str {
        if self.copied {
            COPIED
        } else {
            COPY
        }
    }
}

/// One card per file, in bundle order. `copied` is the index whose
/// confirmation is still showing.
pub fn code_view(bundle: &ProjectBundle, copied: Option<usize>) -> Vec<CodeCard> {
    bundle
        .files
        .iter()
        .enumerate()
        .map(|(index, file)| CodeCard {
            index,
            filename: file.name.clone(),
            caption: file.description.clone(),
            content: file.content.clone(),
            copied: copied == Some(index),
        })
        .collect()
}

// --- Docs tab ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocsView {
    pub html: String,
    pub markdown: String,
}

pub fn docs_view(bundle: &ProjectBundle) -> DocsView {
    DocsView {
        html: svg::escape(&bundle.documentation).replace('\n', "<br/>"),
        markdown: bundle.documentation.clone(),
    }
}

// --- Map tab ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub body: &'static str,
}

pub const FEATURE_CARDS: [FeatureCard; 3] = [
    FeatureCard {
        title: "Interface Inteligente",
        body: "Detecção proativa de formato e validação de regras de negócio antes do envio.",
    },
    FeatureCard {
        title: "Camada de Hash",
        body: "Criptografia de via única (SHA-256) garante que a senha original nunca seja armazenada.",
    },
    FeatureCard {
        title: "Acesso Unificado",
        body: "Busca no banco de dados por múltiplos identificadores (Email/CPF/Nome).",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub layout: Layout,
    pub svg: String,
    pub legend: Vec<LegendEntry>,
    pub cards: Vec<FeatureCard>,
}

pub fn legend() -> Vec<LegendEntry> {
    NodeType::LEGEND
        .iter()
        .map(|t| LegendEntry {
            label: t.legend(),
            color: t.color(),
        })
        .collect()
}

pub fn map_view(bundle: &ProjectBundle, viewport: Viewport) -> MapView {
    let layout = settle(&bundle.mental_map, viewport);
    let svg = svg::render(&layout, &viewport);
    MapView {
        layout,
        svg,
        legend: legend(),
        cards: FEATURE_CARDS.to_vec(),
    }
}

// --- Terminal rendering ---

pub fn render_code(cards: &[CodeCard]) -> String {
    let mut out = String::new();
    for card in cards {
        let _ = writeln!(out, "[{}] {}  ({})", card.index, card.filename, card.button_label());
        if !card.caption.is_empty() {
            let _ = writeln!(out, "    {}", card.caption.to_uppercase());
        }
        let _ = writeln!(out, "{}", "-".repeat(60));
        let _ = writeln!(out, "{}", card.content.trim_end());
        let _ = writeln!(out);
    }
    out
}

pub fn render_docs(docs: &DocsView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", docs.markdown.trim_end());
    out
}

pub fn render_map(map: &MapView) -> String {
    let mut out = String::new();
    let legend: Vec<String> = map
        .legend
        .iter()
        .map(|e| format!("{} {}", e.color, e.label))
        .collect();
    let _ = writeln!(out, "Legenda: {}", legend.join(" | "));
    let _ = writeln!(out);

    for node in &map.layout.nodes {
        let _ = writeln!(
            out,
            "  {:<16} {:<24} ({:>6.1}, {:>6.1})  {}",
            node.id,
            node.label,
            node.x,
            node.y,
            node.node_type.legend()
        );
    }
    for edge in &map.layout.edges {
        let _ = writeln!(out, "  {} -- {}", edge.source, edge.target);
    }
    if !map.layout.dangling.is_empty() {
        let _ = writeln!(out, "  ({} link(s) to unknown nodes not drawn)", map.layout.dangling.len());
    }
    let _ = writeln!(out);

    for card in &map.cards {
        let _ = writeln!(out, "* {}: {}", card.title, card.body);
    }
    out
}

/// Main screen plus, when open, the info panel on the active tab.
pub fn render_screen(shell: &Shell, copied: Option<usize>, viewport: Viewport) -> String {
    let mut out = String::new();
    match shell.screen() {
        Screen::Welcome => {
            let _ = writeln!(out, "{TITLE}\n{SUBTITLE}\n\n> {START_LABEL} (generate)");
        }
        Screen::Generating => {
            let _ = writeln!(out, "{GENERATING_LABEL}");
        }
        Screen::Failed(message) => {
            let _ = writeln!(out, "Erro: {message}\n\n> {START_LABEL} (generate)");
        }
        Screen::Preview => {
            let _ = writeln!(out, "> {INFO_LABEL} (info)\n> {REGENERATE_LABEL} (generate)");
        }
    }

    if let (true, Some(bundle)) = (shell.info_open(), shell.bundle()) {
        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|t| {
                if *t == shell.tab() {
                    format!("[{}]", t.label())
                } else {
                    t.label().to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "\n{}\n", tabs.join("  "));
        out.push_str(&render_tab(bundle, shell.tab(), copied, viewport));
    }
    out
}

pub fn render_tab(
    bundle: &ProjectBundle,
    tab: Tab,
    copied: Option<usize>,
    viewport: Viewport,
) -> String {
    match tab {
        Tab::Code => render_code(&code_view(bundle, copied)),
        Tab::Docs => render_docs(&docs_view(bundle)),
        Tab::Map => render_map(&map_view(bundle, viewport)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pysecure_core::{Graph, GraphLink, GraphNode, ProjectFile};

    fn bundle() -> ProjectBundle {
        let node = |id: &str, t| GraphNode {
            id: id.into(),
            label: id.to_uppercase(),
            node_type: t,
        };
        ProjectBundle {
            files: vec![
                ProjectFile {
                    name: "main.py".into(),
                    content: "import gui\n".into(),
                    description: "Ponto de entrada".into(),
                },
                ProjectFile {
                    name: "security.py".into(),
                    content: "import hashlib\n".into(),
                    description: "Hashing".into(),
                },
            ],
            documentation: "# Projeto\n<b>seguro</b>".into(),
            mental_map: Graph {
                nodes: vec![node("a", NodeType::File), node("b", NodeType::Security)],
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
            },
        }
    }

    #[test]
    fn test_code_cards_follow_file_order() {
        let cards = code_view(&bundle(), None);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].filename, "main.py");
        assert_eq!(cards[1].caption, "Hashing");
        assert!(cards.iter().all(|c| c.button_label() == "Copiar"));
    }

    #[test]
    fn test_copied_card_shows_confirmation() {
        let cards = code_view(&bundle(), Some(1));
        assert!(!cards[0].copied);
        assert!(cards[1].copied);
        assert_eq!(cards[1].button_label(), "Copiado!");
    }

    #[test]
    fn test_docs_html_escapes_and_breaks_lines() {
        let docs = docs_view(&bundle());
        assert_eq!(docs.html, "# Projeto<br/>&lt;b&gt;seguro&lt;/b&gt;");
        assert_eq!(docs.markdown, "# Projeto\n<b>seguro</b>");
    }

    #[test]
    fn test_map_view_skips_dangling_link() {
        let map = map_view(&bundle(), Viewport::default());
        assert_eq!(map.layout.nodes.len(), 2);
        assert_eq!(map.layout.edges.len(), 1);
        assert_eq!(map.layout.dangling.len(), 1);
        assert_eq!(map.svg.matches("<circle ").count(), 2);
        assert_eq!(map.legend.len(), 4);
        assert_eq!(map.cards[1].title, "Camada de Hash");
    }

    #[test]
    fn test_render_map_mentions_dangling() {
        let text = render_map(&map_view(&bundle(), Viewport::default()));
        assert!(text.contains("a -- b"));
        assert!(!text.contains("a -- c"));
        assert!(text.contains("1 link(s) to unknown nodes"));
        assert!(text.contains("Acesso Unificado"));
    }

    #[test]
    fn test_render_screen_by_status() {
        let mut shell = Shell::new();
        let vp = Viewport::default();
        assert!(render_screen(&shell, None, vp).contains(START_LABEL));

        let t = shell.request_generation().unwrap();
        assert!(render_screen(&shell, None, vp).contains(GENERATING_LABEL));

        shell.complete(t, Ok(bundle())).unwrap();
        let text = render_screen(&shell, None, vp);
        assert!(text.contains(INFO_LABEL));
        assert!(!text.contains("main.py"));

        shell.dispatch(crate::shell::Action::OpenInfo).unwrap();
        let text = render_screen(&shell, Some(0), vp);
        assert!(text.contains("[Código Fonte]"));
        assert!(text.contains("[0] main.py  (Copiado!)"));
    }
}
