use serde::{Deserialize, Serialize};
use std::fmt;

/// Lead registration payload, serialized verbatim to `POST /api/leads/cnpj/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateLead {
    /// Company legal name (razão social).
    pub nome: String,
    /// Unformatted CNPJ, exactly 14 digits.
    pub cnpj: String,
    /// Headquarters address.
    pub sede: String,
    /// Caller-side platform identifier.
    pub id_plataforma: String,
    pub representante_legal: String,
    pub email: String,
    /// Phone number with area code, 10 or 11 digits.
    pub whatsapp: String,
}

/// Lead status transition, serialized verbatim to `POST /api/leads/cnpj/atualizar_status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateLeadStatus {
    pub id_plataforma: String,
    pub status: LeadStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Ativo,
    Inativo,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Ativo => "ativo",
            LeadStatus::Inativo => "inativo",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadValidationError {
    InvalidCnpj,
    InvalidWhatsapp,
    EmptyField(&'static str),
}

impl fmt::Display for LeadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadValidationError::InvalidCnpj => {
                f.write_str("cnpj must contain exactly 14 digits without formatting")
            }
            LeadValidationError::InvalidWhatsapp => {
                f.write_str("whatsapp must contain 10 or 11 digits")
            }
            LeadValidationError::EmptyField(name) => write!(f, "{name} must not be empty"),
        }
    }
}

impl std::error::Error for LeadValidationError {}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

impl CreateLead {
    /// Field-level checks applied before the payload is forwarded upstream.
    pub fn validate(&self) -> Result<(), LeadValidationError> {
        if self.cnpj.len() != 14 || !all_digits(&self.cnpj) {
            return Err(LeadValidationError::InvalidCnpj);
        }
        if !matches!(self.whatsapp.len(), 10 | 11) || !all_digits(&self.whatsapp) {
            return Err(LeadValidationError::InvalidWhatsapp);
        }

        [
            ("nome", &self.nome),
            ("sede", &self.sede),
            ("id_plataforma", &self.id_plataforma),
            ("representante_legal", &self.representante_legal),
            ("email", &self.email),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map_or(Ok(()), |(name, _)| Err(LeadValidationError::EmptyField(name)))
    }
}

impl UpdateLeadStatus {
    pub fn validate(&self) -> Result<(), LeadValidationError> {
        if self.id_plataforma.trim().is_empty() {
            return Err(LeadValidationError::EmptyField("id_plataforma"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead() -> CreateLead {
        CreateLead {
            nome: "Farmacia Exemplo LTDA".to_string(),
            cnpj: "12345678000199".to_string(),
            sede: "Rua A, 100".to_string(),
            id_plataforma: "plug-1".to_string(),
            representante_legal: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            whatsapp: "11987654321".to_string(),
        }
    }

    #[test]
    fn create_lead_serializes_with_upstream_field_names() {
        let value = serde_json::to_value(lead()).expect("serialize lead");
        assert_eq!(
            value,
            json!({
                "nome": "Farmacia Exemplo LTDA",
                "cnpj": "12345678000199",
                "sede": "Rua A, 100",
                "id_plataforma": "plug-1",
                "representante_legal": "Maria",
                "email": "maria@example.com",
                "whatsapp": "11987654321"
            })
        );
    }

    #[test]
    fn cnpj_must_be_fourteen_digits() {
        assert!(lead().validate().is_ok());

        let mut bad = lead();
        bad.cnpj = "12.345.678/0001-99".to_string();
        assert_eq!(bad.validate(), Err(LeadValidationError::InvalidCnpj));

        bad.cnpj = "1234567800019".to_string();
        assert_eq!(bad.validate(), Err(LeadValidationError::InvalidCnpj));
    }

    #[test]
    fn whatsapp_accepts_ten_or_eleven_digits() {
        let mut l = lead();
        l.whatsapp = "1133334444".to_string();
        assert!(l.validate().is_ok());

        l.whatsapp = "113333444".to_string();
        assert_eq!(l.validate(), Err(LeadValidationError::InvalidWhatsapp));

        l.whatsapp = "(11)98765-4321".to_string();
        assert_eq!(l.validate(), Err(LeadValidationError::InvalidWhatsapp));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut l = lead();
        l.email = "  ".to_string();
        assert_eq!(l.validate(), Err(LeadValidationError::EmptyField("email")));
    }

    #[test]
    fn lead_status_uses_lowercase_wire_values() {
        let update: UpdateLeadStatus =
            serde_json::from_value(json!({"id_plataforma": "p", "status": "inativo"}))
                .expect("deserialize status update");
        assert_eq!(update.status, LeadStatus::Inativo);

        let err = serde_json::from_value::<UpdateLeadStatus>(
            json!({"id_plataforma": "p", "status": "pausado"}),
        );
        assert!(err.is_err());
    }
}
