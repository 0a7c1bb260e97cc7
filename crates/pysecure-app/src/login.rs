//! Model behind the demo login form. It classifies what is typed and never
//! submits anything.

use std::fmt::Write as _;

use pysecure_core::{classify, IdentifierKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
    pub remember: bool,
    pub kind: IdentifierKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The preview has no backend.
    Ignored,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_identifier(&mut self, value: impl Into<String>) -> IdentifierKind {
        self.identifier = value.into();
        self.kind = classify(&self.identifier);
        self.kind
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.password = value.into();
    }

    pub fn toggle_remember(&mut self) -> bool {
        self.remember = !self.remember;
        self.remember
    }

    pub fn submit(&self) -> Submission {
        tracing::debug!(kind = ?self.kind, "login submit ignored");
        Submission::Ignored
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Bem-vindo\nAcesse sua conta para continuar\n");
        let icon = self.kind.icon().map(|i| format!(" [{i}]")).unwrap_or_default();
        let _ = writeln!(out, "Login ({}){icon}", self.kind.label());
        if self.identifier.is_empty() {
            let _ = writeln!(out, "  Nome, CPF ou E-mail");
        } else {
            let _ = writeln!(out, "  {}", self.identifier);
        }
        let _ = writeln!(out, "Senha\n  {}", "•".repeat(self.password.chars().count().max(8)));
        let check = if self.remember { "x" } else { " " };
        let _ = writeln!(out, "[{check}] Lembrar de mim    Esqueceu a senha?");
        let _ = writeln!(out, "[ Entrar ]");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_reclassified_on_every_change() {
        let mut form = LoginForm::new();
        assert_eq!(form.kind, IdentifierKind::Unknown);
        assert_eq!(form.set_identifier("Maria"), IdentifierKind::Name);
        assert_eq!(form.set_identifier("maria@exemplo.com"), IdentifierKind::Email);
        assert_eq!(form.set_identifier("123.456.789-09"), IdentifierKind::Cpf);
        assert_eq!(form.set_identifier(""), IdentifierKind::Unknown);
    }

    #[test]
    fn test_submit_does_nothing() {
        let mut form = LoginForm::new();
        form.set_identifier("joao@exemplo.com");
        form.set_password("segredo");
        assert_eq!(form.submit(), Submission::Ignored);
        assert_eq!(form.identifier, "joao@exemplo.com");
    }

    #[test]
    fn test_render_shows_badge() {
        let mut form = LoginForm::new();
        form.set_identifier("joao@exemplo.com");
        assert!(form.toggle_remember());
        let text = form.render();
        assert!(text.contains("E-mail Detectado"));
        assert!(text.contains("[mail]"));
        assert!(text.contains("[x] Lembrar de mim"));
    }
}
