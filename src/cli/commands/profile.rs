//! Citizen profile fields shared by `signup`, `complete-profile` and
//! `update-profile`.

use crate::auth::types::{CitizenProfile, CitizenProfileInput};
use clap::{Arg, ArgMatches, Command};

pub const ARG_NOME: &str = "nome";
pub const ARG_CPF: &str = "cpf";
pub const ARG_DATA_NASCIMENTO: &str = "data-nascimento";
pub const ARG_CEP: &str = "cep";
pub const ARG_RUA: &str = "rua";
pub const ARG_BAIRRO: &str = "bairro";
pub const ARG_CIDADE: &str = "cidade";
pub const ARG_UF: &str = "uf";

/// Adds the profile fields. With `required`, the fields a new profile cannot
/// do without must be given.
#[must_use]
pub fn with_args(command: Command, required: bool) -> Command {
    command
        .arg(
            Arg::new(ARG_NOME)
                .long(ARG_NOME)
                .help("Full name")
                .required(required),
        )
        .arg(
            Arg::new(ARG_CPF)
                .long(ARG_CPF)
                .help("CPF (taxpayer id)")
                .required(required),
        )
        .arg(
            Arg::new(ARG_DATA_NASCIMENTO)
                .long(ARG_DATA_NASCIMENTO)
                .help("Birth date, YYYY-MM-DD")
                .required(required),
        )
        .arg(
            Arg::new(ARG_CEP)
                .long(ARG_CEP)
                .help("Postal code; street, district, city and state are looked up when omitted")
                .required(required),
        )
        .arg(Arg::new(ARG_RUA).long(ARG_RUA).help("Street"))
        .arg(Arg::new(ARG_BAIRRO).long(ARG_BAIRRO).help("District"))
        .arg(Arg::new(ARG_CIDADE).long(ARG_CIDADE).help("City"))
        .arg(Arg::new(ARG_UF).long(ARG_UF).help("State (UF)"))
}

/// Profile fields as given on the command line; absent flags are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub data_nascimento: Option<String>,
    pub cep: Option<String>,
    pub rua: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let get = |id: &str| matches.get_one::<String>(id).map(|value| value.trim().to_string());
        Self {
            nome: get(ARG_NOME),
            cpf: get(ARG_CPF),
            data_nascimento: get(ARG_DATA_NASCIMENTO),
            cep: get(ARG_CEP),
            rua: get(ARG_RUA),
            bairro: get(ARG_BAIRRO),
            cidade: get(ARG_CIDADE),
            uf: get(ARG_UF),
        }
    }

    /// Input for a new profile; absent fields stay blank.
    #[must_use]
    pub fn to_input(&self) -> CitizenProfileInput {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        CitizenProfileInput {
            nome: field(&self.nome),
            cpf: field(&self.cpf),
            data_nascimento: field(&self.data_nascimento),
            cep: field(&self.cep),
            rua: field(&self.rua),
            bairro: field(&self.bairro),
            cidade: field(&self.cidade),
            uf: field(&self.uf),
            data_cadastro: None,
        }
    }

    /// Copy of `profile` with every given field replaced.
    #[must_use]
    pub fn apply_to(&self, profile: &CitizenProfile) -> CitizenProfile {
        let mut updated = profile.clone();
        let pairs = [
            (&self.nome, &mut updated.nome),
            (&self.cpf, &mut updated.cpf),
            (&self.data_nascimento, &mut updated.data_nascimento),
            (&self.cep, &mut updated.cep),
            (&self.rua, &mut updated.rua),
            (&self.bairro, &mut updated.bairro),
            (&self.cidade, &mut updated.cidade),
            (&self.uf, &mut updated.uf),
        ];
        for (value, target) in pairs {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        updated
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
