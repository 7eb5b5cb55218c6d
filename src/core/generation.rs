use crate::core::composer::delivery_or_pending;
use crate::domain::model::{Listing, ResponsePayload};
use serde::{Deserialize, Serialize};

pub const MAX_FOLLOWUPS: usize = 3;

#[derive(Debug, Serialize)]
struct ListingSummary<'a> {
    nome: &'a str,
    bairro: &'a str,
    tipologias: &'a [String],
    entrega: &'a str,
    descricao: &'a str,
}

/// System instruction grounding the generator on the resolved candidates.
pub fn build_system_instruction(listings: &[Listing]) -> String {
    let summaries: Vec<ListingSummary<'_>> = listings
        .iter()
        .map(|l| ListingSummary {
            nome: &l.name,
            bairro: &l.neighborhood,
            tipologias: &l.property_types,
            entrega: delivery_or_pending(l),
            descricao: l.description.trim(),
        })
        .collect();
    let catalog_json =
        serde_json::to_string_pretty(&summaries).unwrap_or_else(|_| "[]".to_string());

    [
        "Você é um corretor imobiliário humano e profissional atendendo pelo WhatsApp.",
        "Redija a resposta usando exclusivamente os empreendimentos abaixo. Não invente empreendimentos, preços ou datas.",
        "Regras obrigatórias:",
        "- NÃO incluir assinatura, nome da empresa, CRECI, telefone, e-mail ou links.",
        "- Texto corrido, cordial e objetivo, convidando o cliente a avançar.",
        "- Sugira até 3 perguntas curtas de continuação.",
        "",
        "Empreendimentos disponíveis (use apenas estes):",
        catalog_json.as_str(),
        "",
        r#"Retorne APENAS JSON no formato: { "text": "resposta", "followups": ["pergunta 1", "pergunta 2"] }"#,
    ]
    .join("\n")
}

#[derive(Debug, Deserialize)]
struct GeneratedReply {
    #[serde(alias = "resposta")]
    text: String,
    #[serde(default)]
    followups: Vec<String>,
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Validates raw generator output against the expected `{ text, followups }`
/// shape. Plain text, empty text or any other shape yields `None`.
pub fn parse_generated_reply(raw: &str) -> Option<ResponsePayload> {
    let reply: GeneratedReply = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let text = reply.text.trim();
    if text.is_empty() {
        return None;
    }

    let followups = reply
        .followups
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .take(MAX_FOLLOWUPS)
        .collect();

    Some(ResponsePayload {
        text: text.to_string(),
        followups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::niteroi_catalog;

    #[test]
    fn test_system_instruction_embeds_candidates_only() {
        let catalog = niteroi_catalog();
        let instruction = build_system_instruction(&catalog.listings()[..1]);

        assert!(instruction.contains("\"nome\": \"Marem\""));
        assert!(instruction.contains("\"entrega\": \"Dez/2026\""));
        assert!(!instruction.contains("Nexus"));
        assert!(instruction.contains("NÃO incluir assinatura"));
    }

    #[test]
    fn test_parses_structured_reply() {
        let raw = r#"{"text": " O Marem tem 2 e 3 quartos. ", "followups": ["Quer visitar?", "", "a", "b", "c"]}"#;
        let payload = parse_generated_reply(raw).unwrap();
        assert_eq!(payload.text, "O Marem tem 2 e 3 quartos.");
        assert_eq!(payload.followups, vec!["Quer visitar?", "a", "b"]);
    }

    #[test]
    fn test_accepts_fenced_and_legacy_key() {
        let raw = "```json\n{\"resposta\": \"Olá!\"}\n```";
        let payload = parse_generated_reply(raw).unwrap();
        assert_eq!(payload.text, "Olá!");
        assert!(payload.followups.is_empty());
    }

    #[test]
    fn test_rejects_unexpected_shapes() {
        assert!(parse_generated_reply("Claro! O Marem é ótimo.").is_none());
        assert!(parse_generated_reply(r#"{"text": "   "}"#).is_none());
        assert!(parse_generated_reply(r#"{"message": "oi"}"#).is_none());
        assert!(parse_generated_reply(r#"["oi"]"#).is_none());
        assert!(parse_generated_reply(r#"{"text": 42}"#).is_none());
    }
}
