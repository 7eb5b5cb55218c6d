use crate::core::normalizer::normalize;
use crate::utils::error::{HeroError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_COMPANY: &str = "Hero Imóveis";
pub const DEFAULT_SIGNATURE: &str =
    "Atenciosamente,\nEquipe Hero Imóveis\nCorretor de Imóveis | CRECI-RJ 12345-J\n(21) 99999-0000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMode {
    Always,
    Never,
    #[default]
    Closing,
}

impl FromStr for SignatureMode {
    type Err = HeroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(SignatureMode::Always),
            "never" => Ok(SignatureMode::Never),
            "closing" => Ok(SignatureMode::Closing),
            other => Err(HeroError::InvalidConfigValueError {
                field: "signature.mode".to_string(),
                value: other.to_string(),
                reason: "Expected one of: always, never, closing".to_string(),
            }),
        }
    }
}

const FRAGMENT_PATTERNS: [&str; 7] = [
    r"(?i)\bcorretora?\s+de\s+im[oó]veis\b",
    r"(?i)\bcreci\b(?:[\s:/\-]*[a-z]{2}\b)?(?:[\s:nº°#.\-]*\d[\d./\-]*(?:-?[jf]\b)?)?",
    r"(?:\+?55[\s.\-]?)?(?:\(\d{2}\)|\b\d{2})[\s.\-]?9?\d{4}[\s.\-]?\d{4}\b",
    r"[\w.+\-]+@[\w\-]+(?:\.[\w\-]+)+",
    r"(?i)\b(?:https?://|www\.)\S+",
    r"(?i)\bwa\.me/\S*",
    r"(?i)\blinktr\.ee/\S*",
];

const USER_CLOSING_PATTERN: &str = r"\b(?:obrigad[oa]s?|muito obrigad|valeu|agradeco|grato|grata|vou pensar|vou analisar|vou avaliar|vou ver com|depois (?:te )?(?:falo|retorno|chamo)|boa noite|bom descanso|tenha um bom dia|otimo dia|boa semana|bom fim de semana|ate mais|ate logo|tchau|abracos?)\b";
const REPLY_CLOSING_PATTERN: &str = r"\b(?:fico a disposicao|estou a disposicao|sigo a disposicao|qualquer duvida|conte comigo|fique a vontade|sinta-se a vontade|e so me chamar|estou por aqui|quando quiser)\b";

/// Strips contact data a generator may echo and decides whether the
/// canonical signature goes at the end of the reply.
pub struct TextSanitizer {
    mode: SignatureMode,
    signature: String,
    fragments: Vec<Regex>,
    separator_line: Regex,
    blank_runs: Regex,
    space_runs: Regex,
    user_closing: Regex,
    reply_closing: Regex,
}

impl TextSanitizer {
    pub fn new(mode: SignatureMode, signature: &str, company: &str) -> Result<Self> {
        let mut fragments = FRAGMENT_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if !company.trim().is_empty() {
            fragments.push(Regex::new(&format!(r"(?i)\b{}\b", regex::escape(company.trim())))?);
        }

        Ok(Self {
            mode,
            signature: signature.trim().to_string(),
            fragments,
            separator_line: Regex::new(r"^[\s|\-–—•·:,;/]*$")?,
            blank_runs: Regex::new(r"\n{3,}")?,
            space_runs: Regex::new(r"[ \t]{2,}")?,
            user_closing: Regex::new(USER_CLOSING_PATTERN)?,
            reply_closing: Regex::new(REPLY_CLOSING_PATTERN)?,
        })
    }

    pub fn with_defaults(mode: SignatureMode) -> Result<Self> {
        Self::new(mode, DEFAULT_SIGNATURE, DEFAULT_COMPANY)
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    pub fn contains_fragment(&self, text: &str) -> bool {
        (!self.signature.is_empty() && text.contains(&self.signature))
            || self.fragments.iter().any(|re| re.is_match(text))
    }

    /// Removes the canonical signature and every contact fragment, then
    /// drops the separator debris left behind.
    pub fn strip_signature(&self, text: &str) -> String {
        let mut out = if self.signature.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.signature, "")
        };
        for re in &self.fragments {
            out = re.replace_all(&out, "").into_owned();
        }

        let lines: Vec<String> = out
            .lines()
            .map(|line| self.space_runs.replace_all(line.trim(), " ").into_owned())
            .filter(|line| line.is_empty() || !self.separator_line.is_match(line))
            .collect();
        let joined = lines.join("\n");
        self.blank_runs
            .replace_all(joined.trim(), "\n\n")
            .into_owned()
    }

    pub fn is_closing_user_text(&self, user_text: &str) -> bool {
        self.user_closing.is_match(&normalize(user_text))
    }

    pub fn is_closing_reply_text(&self, reply_text: &str) -> bool {
        self.reply_closing.is_match(&normalize(reply_text))
    }

    pub fn should_append_signature(
        &self,
        mode: SignatureMode,
        user_text: &str,
        reply_text: &str,
    ) -> bool {
        if mode == SignatureMode::Never || self.signature.is_empty() {
            return false;
        }
        if self.contains_fragment(reply_text) {
            return false;
        }
        match mode {
            SignatureMode::Always => true,
            SignatureMode::Closing => {
                self.is_closing_user_text(user_text) || self.is_closing_reply_text(reply_text)
            }
            SignatureMode::Never => false,
        }
    }

    pub fn append_signature(&self, reply_text: &str, user_text: &str) -> String {
        if self.should_append_signature(self.mode, user_text, reply_text) {
            format!("{}\n\n{}", reply_text.trim_end(), self.signature)
        } else {
            reply_text.to_string()
        }
    }

    /// Strip pass followed by the append pass; idempotent.
    pub fn sanitize(&self, reply_text: &str, user_text: &str) -> String {
        let stripped = self.strip_signature(reply_text);
        self.append_signature(&stripped, user_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer(mode: SignatureMode) -> TextSanitizer {
        TextSanitizer::with_defaults(mode).unwrap()
    }

    #[test]
    fn test_strips_contact_fragments() {
        let s = sanitizer(SignatureMode::Never);
        let reply = "O Marem tem 2 quartos.\nMe chame no (21) 98888-7777 ou joao@heroimoveis.com.br\nwww.heroimoveis.com.br\nCorretor de Imóveis | CRECI 54321";
        assert_eq!(s.strip_signature(reply), "O Marem tem 2 quartos.\nMe chame no ou");
    }

    #[test]
    fn test_strips_echoed_canonical_signature_and_company() {
        let s = sanitizer(SignatureMode::Never);
        let reply = format!("Posso ajudar com mais algo?\n\n{}", DEFAULT_SIGNATURE);
        assert_eq!(s.strip_signature(&reply), "Posso ajudar com mais algo?");
        assert_eq!(s.strip_signature("Aqui é da Hero Imóveis."), "Aqui é da .");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let s = sanitizer(SignatureMode::Never);
        let reply = "Encontrei estas opções:\n\n- Marem, em Icaraí. Entrega: Dez/2026.\n\nQuer agendar? 😊";
        assert_eq!(s.strip_signature(reply), reply);
    }

    #[test]
    fn test_closing_user_text_appends_in_closing_mode() {
        let s = sanitizer(SignatureMode::Closing);
        assert!(s.should_append_signature(
            SignatureMode::Closing,
            "obrigado, vou pensar",
            "Combinado!"
        ));
        assert!(!s.should_append_signature(
            SignatureMode::Closing,
            "tem studio em icarai?",
            "Tenho estas opções."
        ));
    }

    #[test]
    fn test_closing_reply_text_appends_in_closing_mode() {
        let s = sanitizer(SignatureMode::Closing);
        assert!(s.should_append_signature(
            SignatureMode::Closing,
            "e o marem?",
            "Fico à disposição para qualquer dúvida."
        ));
    }

    #[test]
    fn test_mode_overrides() {
        let s = sanitizer(SignatureMode::Closing);
        assert!(s.should_append_signature(SignatureMode::Always, "oi", "Olá!"));
        assert!(!s.should_append_signature(SignatureMode::Never, "obrigado", "Olá!"));
        assert!(!s.should_append_signature(
            SignatureMode::Always,
            "oi",
            "Ligue (21) 98888-7777"
        ));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let s = sanitizer(SignatureMode::Closing);
        let user = "valeu, boa noite";
        let reply = "Eu que agradeço! Fico à disposição.\nCRECI 12345\n(21) 98888-7777";

        let once = s.sanitize(reply, user);
        let twice = s.sanitize(&once, user);
        assert_eq!(once, twice);
        assert_eq!(once.matches("Atenciosamente").count(), 1);
        assert!(once.starts_with("Eu que agradeço! Fico à disposição.\n\nAtenciosamente,"));
    }

    #[test]
    fn test_sanitize_without_closing_is_idempotent() {
        let s = sanitizer(SignatureMode::Closing);
        let once = s.sanitize("Tenho 2 opções em Icaraí.  www.x.com", "icarai 2 quartos");
        assert_eq!(once, "Tenho 2 opções em Icaraí.");
        assert_eq!(s.sanitize(&once, "icarai 2 quartos"), once);
    }

    #[test]
    fn test_signature_mode_from_str() {
        assert_eq!("ALWAYS".parse::<SignatureMode>().unwrap(), SignatureMode::Always);
        assert_eq!("closing".parse::<SignatureMode>().unwrap(), SignatureMode::Closing);
        assert!("sometimes".parse::<SignatureMode>().is_err());
    }
}
