//! User-facing message catalog
//!
//! The live site is Portuguese; English is the default for tooling and tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-gb" | "en-us" => Ok(Locale::En),
            "pt" | "pt-pt" | "pt-br" => Ok(Locale::Pt),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::Pt => f.write_str("pt"),
        }
    }
}

impl Locale {
    // === Field messages ===

    pub fn required(&self) -> String {
        match self {
            Locale::En => "This field is required.".into(),
            Locale::Pt => "Este campo é obrigatório.".into(),
        }
    }

    pub fn invalid_email(&self) -> String {
        match self {
            Locale::En => "Please enter a valid email address.".into(),
            Locale::Pt => "Por favor, insira um email válido.".into(),
        }
    }

    pub fn invalid_phone(&self) -> String {
        match self {
            Locale::En => "Please enter a valid phone number.".into(),
            Locale::Pt => "Por favor, insira um número de telefone válido.".into(),
        }
    }

    pub fn invalid_age(&self) -> String {
        match self {
            Locale::En => "Please enter a valid age.".into(),
            Locale::Pt => "Por favor, insira uma idade válida.".into(),
        }
    }

    pub fn min_age(&self, min: i64) -> String {
        match self {
            Locale::En => format!("Minimum age is {min}."),
            Locale::Pt => format!("A idade mínima é {min} anos."),
        }
    }

    pub fn max_age(&self, max: i64) -> String {
        match self {
            Locale::En => format!("Maximum age is {max}."),
            Locale::Pt => format!("A idade máxima é {max} anos."),
        }
    }

    pub fn name_too_short(&self, min: usize) -> String {
        match self {
            Locale::En => format!("Name must be at least {min} characters long."),
            Locale::Pt => format!("O nome deve ter pelo menos {min} caracteres."),
        }
    }

    pub fn description_too_short(&self, min: usize) -> String {
        match self {
            Locale::En => {
                format!("Please provide a more detailed description (minimum {min} characters).")
            }
            Locale::Pt => {
                format!("Por favor, forneça uma descrição mais detalhada (mínimo {min} caracteres).")
            }
        }
    }

    pub fn photo_not_image(&self) -> String {
        match self {
            Locale::En => "Please select an image file.".into(),
            Locale::Pt => "Por favor, selecione apenas arquivos de imagem.".into(),
        }
    }

    pub fn photo_too_large(&self, max_mb: usize) -> String {
        match self {
            Locale::En => format!("The file must be at most {max_mb}MB."),
            Locale::Pt => format!("O arquivo deve ter no máximo {max_mb}MB."),
        }
    }

    // === Submission messages ===

    pub fn too_young(&self, min: i64) -> String {
        match self {
            Locale::En => format!("You must be at least {min} years old to apply."),
            Locale::Pt => format!("Deve ter pelo menos {min} anos para se candidatar."),
        }
    }

    pub fn too_old(&self, max: i64) -> String {
        match self {
            Locale::En => format!("The maximum age for applications is {max}."),
            Locale::Pt => format!("A idade máxima para candidatura é {max} anos."),
        }
    }

    pub fn submitted(&self) -> String {
        match self {
            Locale::En => "Application sent successfully! We will be in touch soon.".into(),
            Locale::Pt => {
                "✨ Candidatura enviada com sucesso! Entraremos em contacto em breve.".into()
            }
        }
    }

    pub fn submit_failed(&self, detail: &str) -> String {
        match self {
            Locale::En => format!("Error sending application: {detail}"),
            Locale::Pt => format!("❌ Erro ao enviar: {detail}"),
        }
    }

    pub fn unknown_error(&self) -> String {
        match self {
            Locale::En => "Unknown error".into(),
            Locale::Pt => "Erro desconhecido".into(),
        }
    }

    pub fn connection_error(&self, detail: &str) -> String {
        match self {
            Locale::En => format!("Connection error: {detail}"),
            Locale::Pt => format!("❌ Erro de conexão: {detail}"),
        }
    }
}
