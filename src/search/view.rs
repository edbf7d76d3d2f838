//! Display-ready result structures (no markup): contact cards, regional
//! reports, and the user-facing status messages.

use serde::Serialize;

use crate::data::record::{
    ContactRecord, RegionalRecord, FIELD_COORDINATOR, FIELD_EMAIL, FIELD_INSTITUTIONAL_EMAIL,
    FIELD_MUNICIPALITY, FIELD_OTHER_PHONES, FIELD_PHONE, FIELD_REGIONAL,
};
use crate::data::store::Snapshot;
use crate::search::{regional_for, RegionalSearch};

const MISSING_NAME: &str = "Nome não informado";
const MISSING_MUNICIPALITY: &str = "Município não informado";
const MISSING_VALUE: &str = "Não informado";
const MISSING_REGIONAL_VALUE: &str = "---";

/// Contact fields already shown in the card heading.
const CARD_HEADING_FIELDS: [&str; 3] = [FIELD_COORDINATOR, FIELD_MUNICIPALITY, FIELD_REGIONAL];

/// User-facing status texts.
pub mod messages {
    pub const LOADING: &str = "Carregando dados da planilha...";
    pub const LOADED: &str = "Dados carregados. Pronto para buscar.";
    pub const LOAD_FAILED: &str =
        "Erro ao carregar os dados. Verifique o link da planilha e sua conexão.";
    pub const READY: &str = "Pronto para buscar.";
    pub const MISSING_CONTACT_CRITERIA: &str =
        "Por favor, digite um nome ou selecione um município para buscar.";
    pub const MISSING_REGIONAL: &str = "Por favor, selecione uma regional para buscar.";
    pub const NO_CONTACTS: &str = "Nenhum contato encontrado com os critérios informados.";
    pub const NO_MEMBERS: &str = "Nenhum município associado a esta regional foi encontrado.";

    pub fn no_regional_data(regional: &str) -> String {
        format!("Nenhum dado encontrado para a {regional}.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub value: String,
}

/// Leadership block of a regional office, with `---` for blank cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalSummary {
    pub name: String,
    pub chief: String,
    pub chief_contact: String,
    pub assistant: String,
    pub assistant_contact: String,
    pub email: String,
}

impl RegionalSummary {
    pub fn from_record(regional: &RegionalRecord) -> Self {
        let or_dash = |value: &str| {
            if value.is_empty() {
                MISSING_REGIONAL_VALUE.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            name: regional.regional_key().to_string(),
            chief: or_dash(regional.chief_name()),
            chief_contact: or_dash(regional.chief_contact()),
            assistant: or_dash(regional.assistant_name()),
            assistant_contact: or_dash(regional.assistant_contact()),
            email: or_dash(regional.office_email()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub title: String,
    pub subtitle: String,
    /// Remaining contact columns, in sheet order.
    pub details: Vec<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional: Option<RegionalSummary>,
}

pub fn contact_card(snapshot: &Snapshot, contact: &ContactRecord) -> ContactCard {
    let details = contact
        .record()
        .ordered(snapshot.contact_headers())
        .filter(|(name, _)| !CARD_HEADING_FIELDS.contains(name))
        .map(|(name, value)| FieldValue {
            name: name.to_string(),
            value: if value.is_empty() {
                MISSING_VALUE.to_string()
            } else {
                value.to_string()
            },
        })
        .collect();

    ContactCard {
        title: non_empty_or(contact.coordinator_name(), MISSING_NAME),
        subtitle: non_empty_or(contact.municipality(), MISSING_MUNICIPALITY),
        details,
        regional: regional_for(snapshot, contact).map(RegionalSummary::from_record),
    }
}

/// One line of the regional members table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRow {
    pub municipality: String,
    pub coordinator: String,
    pub phone: String,
    pub other_phones: String,
    pub institutional_email: String,
    pub email: String,
}

impl MemberRow {
    pub fn from_contact(contact: &ContactRecord) -> Self {
        Self {
            municipality: contact.municipality().to_string(),
            coordinator: contact.coordinator_name().to_string(),
            phone: contact.field(FIELD_PHONE).to_string(),
            other_phones: contact.field(FIELD_OTHER_PHONES).to_string(),
            institutional_email: contact.field(FIELD_INSTITUTIONAL_EMAIL).to_string(),
            email: contact.field(FIELD_EMAIL).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RegionalSummary>,
    pub members: Vec<MemberRow>,
    pub not_found: bool,
    /// Status text for the empty cases; `None` when there is data to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn regional_report(regional_key: &str, search: &RegionalSearch<'_>) -> RegionalReport {
    let not_found = search.is_not_found();
    let message = if not_found {
        Some(messages::no_regional_data(regional_key))
    } else if search.member_contacts.is_empty() {
        Some(messages::NO_MEMBERS.to_string())
    } else {
        None
    };

    RegionalReport {
        name: regional_key.to_string(),
        summary: search.regional_info.map(RegionalSummary::from_record),
        members: search
            .member_contacts
            .iter()
            .map(|contact| MemberRow::from_contact(contact))
            .collect(),
        not_found,
        message,
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
