//! The candidate record, its partial-update input, and the field table
//! shared by the filter, CSV, and spreadsheet codecs.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::CandidateId;

// ---------------------------------------------------------------------------
// Field table
// ---------------------------------------------------------------------------

/// Every attribute of a [`Candidate`], in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Order,
    Name,
    BirthDate,
    BirthCountry,
    BirthPlace,
    Address,
    PassportProfession,
    ProjectProfession,
    PassportNumber,
    IssueDate,
    ExpiryDate,
    IssuingAuthority,
    IdNumber,
    IsReserve,
    Agent,
    Representative,
    PhoneNumber,
    Notes,
    FirstPayment,
    SecondPayment,
    ThirdPayment,
    TotalPayments,
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Id,
        Field::Order,
        Field::Name,
        Field::BirthDate,
        Field::BirthCountry,
        Field::BirthPlace,
        Field::Address,
        Field::PassportProfession,
        Field::ProjectProfession,
        Field::PassportNumber,
        Field::IssueDate,
        Field::ExpiryDate,
        Field::IssuingAuthority,
        Field::IdNumber,
        Field::IsReserve,
        Field::Agent,
        Field::Representative,
        Field::PhoneNumber,
        Field::Notes,
        Field::FirstPayment,
        Field::SecondPayment,
        Field::ThirdPayment,
        Field::TotalPayments,
    ];

    /// JSON / CSV column key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Order => "order",
            Self::Name => "name",
            Self::BirthDate => "birthDate",
            Self::BirthCountry => "birthCountry",
            Self::BirthPlace => "birthPlace",
            Self::Address => "address",
            Self::PassportProfession => "passportProfession",
            Self::ProjectProfession => "projectProfession",
            Self::PassportNumber => "passportNumber",
            Self::IssueDate => "issueDate",
            Self::ExpiryDate => "expiryDate",
            Self::IssuingAuthority => "issuingAuthority",
            Self::IdNumber => "idNumber",
            Self::IsReserve => "isReserve",
            Self::Agent => "agent",
            Self::Representative => "representative",
            Self::PhoneNumber => "phoneNumber",
            Self::Notes => "notes",
            Self::FirstPayment => "firstPayment",
            Self::SecondPayment => "secondPayment",
            Self::ThirdPayment => "thirdPayment",
            Self::TotalPayments => "totalPayments",
        }
    }

    /// Column heading used by the Arabic-language screens and sheets.
    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "المعرف",
            Self::Order => "الترتيب",
            Self::Name => "الاسم",
            Self::BirthDate => "تاريخ الميلاد",
            Self::BirthCountry => "بلد الميلاد",
            Self::BirthPlace => "محل الميلاد",
            Self::Address => "العنوان",
            Self::PassportProfession => "المهنة في جواز السفر",
            Self::ProjectProfession => "المهنة المعتمدة للعمل",
            Self::PassportNumber => "رقم الجواز",
            Self::IssueDate => "تاريخ الإصدار",
            Self::ExpiryDate => "تاريخ الانتهاء",
            Self::IssuingAuthority => "جهة الإصدار",
            Self::IdNumber => "رقم الهوية",
            Self::IsReserve => "احتياطي",
            Self::Agent => "الوكيل",
            Self::Representative => "المندوب",
            Self::PhoneNumber => "رقم الجوال",
            Self::Notes => "ملاحظات",
            Self::FirstPayment => "الدفعة الأولى",
            Self::SecondPayment => "الدفعة الثانية",
            Self::ThirdPayment => "الدفعة الثالثة",
            Self::TotalPayments => "مجموع الدفعات",
        }
    }

    /// Resolve a column heading to a field.
    ///
    /// Matches the key case-insensitively or the Arabic label exactly,
    /// ignoring surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Field> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(header) || f.label() == header)
    }

    /// Whether the field holds a payment amount.
    pub fn is_amount(self) -> bool {
        matches!(
            self,
            Self::FirstPayment | Self::SecondPayment | Self::ThirdPayment | Self::TotalPayments
        )
    }

    /// Whether the field is computed by the collection and never accepted as input.
    pub fn is_derived(self) -> bool {
        matches!(self, Self::Id | Self::Order | Self::TotalPayments)
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A job-selection applicant profile plus its payment ledger.
///
/// `order` and `total_payments` are owned by the collection: they are
/// recomputed after every mutation and never trusted from input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    #[serde(deserialize_with = "lenient_text")]
    pub id: CandidateId,
    #[serde(deserialize_with = "lenient_order")]
    pub order: u32,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub birth_date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub birth_country: String,
    #[serde(deserialize_with = "lenient_text")]
    pub birth_place: String,
    #[serde(deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(deserialize_with = "lenient_text")]
    pub passport_profession: String,
    #[serde(deserialize_with = "lenient_text")]
    pub project_profession: String,
    #[serde(deserialize_with = "lenient_text")]
    pub passport_number: String,
    #[serde(deserialize_with = "lenient_text")]
    pub issue_date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub expiry_date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub issuing_authority: String,
    #[serde(deserialize_with = "lenient_text")]
    pub id_number: String,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_reserve: bool,
    #[serde(deserialize_with = "lenient_text")]
    pub agent: String,
    #[serde(deserialize_with = "lenient_text")]
    pub representative: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phone_number: String,
    #[serde(deserialize_with = "lenient_text")]
    pub notes: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub first_payment: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub second_payment: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub third_payment: f64,
    #[serde(deserialize_with = "lenient_total")]
    pub total_payments: f64,
}

impl Candidate {
    /// Build a fresh record from partial input. Missing fields take their
    /// defaults and the total is derived.
    pub fn from_input(id: CandidateId, input: &CandidateInput) -> Self {
        let mut candidate = Candidate {
            id,
            ..Default::default()
        };
        candidate.apply(input);
        candidate
    }

    /// Merge every present field of `input` and re-derive the total.
    pub fn apply(&mut self, input: &CandidateInput) {
        fn merge<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        merge(&mut self.name, &input.name);
        merge(&mut self.birth_date, &input.birth_date);
        merge(&mut self.birth_country, &input.birth_country);
        merge(&mut self.birth_place, &input.birth_place);
        merge(&mut self.address, &input.address);
        merge(&mut self.passport_profession, &input.passport_profession);
        merge(&mut self.project_profession, &input.project_profession);
        merge(&mut self.passport_number, &input.passport_number);
        merge(&mut self.issue_date, &input.issue_date);
        merge(&mut self.expiry_date, &input.expiry_date);
        merge(&mut self.issuing_authority, &input.issuing_authority);
        merge(&mut self.id_number, &input.id_number);
        merge(&mut self.is_reserve, &input.is_reserve);
        merge(&mut self.agent, &input.agent);
        merge(&mut self.representative, &input.representative);
        merge(&mut self.phone_number, &input.phone_number);
        merge(&mut self.notes, &input.notes);
        merge(&mut self.first_payment, &input.first_payment);
        merge(&mut self.second_payment, &input.second_payment);
        merge(&mut self.third_payment, &input.third_payment);

        self.derive_total();
    }

    /// Recompute `total_payments` from the three payment fields.
    pub fn derive_total(&mut self) {
        self.total_payments = self.first_payment + self.second_payment + self.third_payment;
    }

    /// Display text of a single field, as shown in tables and exports.
    pub fn text(&self, field: Field) -> String {
        match field {
            Field::Id => self.id.clone(),
            Field::Order => self.order.to_string(),
            Field::Name => self.name.clone(),
            Field::BirthDate => self.birth_date.clone(),
            Field::BirthCountry => self.birth_country.clone(),
            Field::BirthPlace => self.birth_place.clone(),
            Field::Address => self.address.clone(),
            Field::PassportProfession => self.passport_profession.clone(),
            Field::ProjectProfession => self.project_profession.clone(),
            Field::PassportNumber => self.passport_number.clone(),
            Field::IssueDate => self.issue_date.clone(),
            Field::ExpiryDate => self.expiry_date.clone(),
            Field::IssuingAuthority => self.issuing_authority.clone(),
            Field::IdNumber => self.id_number.clone(),
            Field::IsReserve => format_flag(self.is_reserve).to_string(),
            Field::Agent => self.agent.clone(),
            Field::Representative => self.representative.clone(),
            Field::PhoneNumber => self.phone_number.clone(),
            Field::Notes => self.notes.clone(),
            Field::FirstPayment => format_amount(self.first_payment),
            Field::SecondPayment => format_amount(self.second_payment),
            Field::ThirdPayment => format_amount(self.third_payment),
            Field::TotalPayments => format_amount(self.total_payments),
        }
    }
}

// ---------------------------------------------------------------------------
// CandidateInput
// ---------------------------------------------------------------------------

/// Partial record accepted by create, update, and import.
///
/// `id`, `order`, and `totalPayments` are not part of the input shape: the
/// collection owns them, so unknown keys like these are dropped on
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInput {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub birth_country: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub birth_place: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub passport_profession: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub project_profession: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub passport_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub issuing_authority: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub id_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_flag")]
    pub is_reserve: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub agent: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub representative: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_amount")]
    pub first_payment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_amount")]
    pub second_payment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_amount")]
    pub third_payment: Option<f64>,
}

impl CandidateInput {
    /// Set a field from spreadsheet text.
    ///
    /// Derived fields are ignored. Blank amounts become `0`; non-numeric
    /// amounts are rejected with the offending text.
    pub fn set_text(&mut self, field: Field, raw: &str) -> Result<(), String> {
        let text = || Some(raw.to_string());
        match field {
            Field::Id | Field::Order | Field::TotalPayments => {}
            Field::Name => self.name = text(),
            Field::BirthDate => self.birth_date = text(),
            Field::BirthCountry => self.birth_country = text(),
            Field::BirthPlace => self.birth_place = text(),
            Field::Address => self.address = text(),
            Field::PassportProfession => self.passport_profession = text(),
            Field::ProjectProfession => self.project_profession = text(),
            Field::PassportNumber => self.passport_number = text(),
            Field::IssueDate => self.issue_date = text(),
            Field::ExpiryDate => self.expiry_date = text(),
            Field::IssuingAuthority => self.issuing_authority = text(),
            Field::IdNumber => self.id_number = text(),
            Field::IsReserve => self.is_reserve = Some(parse_flag(raw)),
            Field::Agent => self.agent = text(),
            Field::Representative => self.representative = text(),
            Field::PhoneNumber => self.phone_number = text(),
            Field::Notes => self.notes = text(),
            Field::FirstPayment => self.first_payment = Some(parse_amount(raw)?),
            Field::SecondPayment => self.second_payment = Some(parse_amount(raw)?),
            Field::ThirdPayment => self.third_payment = Some(parse_amount(raw)?),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Text conversions
// ---------------------------------------------------------------------------

/// Largest accepted magnitude of a single payment. Three of these still sum
/// to a finite, exactly representable total.
pub const MAX_AMOUNT: f64 = 1e15;

/// Parse a payment amount. Blank text is `0`; non-numeric or out-of-range
/// text is rejected with the offending text.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(check_amount)
        .ok_or_else(|| trimmed.to_string())
}

/// `Some(value)` when it is a usable payment amount.
pub fn check_amount(value: f64) -> Option<f64> {
    (value.is_finite() && value.abs() <= MAX_AMOUNT).then_some(value)
}

/// Parse a reserve flag. Anything not recognised as "yes" is `false`.
pub fn parse_flag(raw: &str) -> bool {
    let trimmed = raw.trim();
    ["true", "yes", "1", "نعم"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(trimmed))
}

/// Spreadsheet spelling of a flag.
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Render an amount without a trailing `.0` for whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Lenient serde helpers
// ---------------------------------------------------------------------------

// Stored documents and browser forms send numbers as strings, flags as
// "TRUE"/"FALSE", and numeric ids as numbers.

fn value_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Non-numeric values read as `0`; numbers beyond [`MAX_AMOUNT`] are an error.
fn value_amount(value: serde_json::Value) -> Result<Option<f64>, String> {
    let number = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if !n.is_nan() => n,
            _ => 0.0,
        },
        serde_json::Value::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    check_amount(number)
        .map(Some)
        .ok_or_else(|| format!("payment amount {number} is out of range"))
}

fn value_flag(value: serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(b),
        serde_json::Value::String(s) => Some(parse_flag(&s)),
        serde_json::Value::Number(n) => Some(n.as_f64().is_some_and(|v| v != 0.0)),
        _ => Some(false),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_text(d)?.unwrap_or_default())
}

fn lenient_opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    serde_json::Value::deserialize(d).map(value_text)
}

fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(lenient_opt_amount(d)?.unwrap_or_default())
}

fn lenient_opt_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    value_amount(serde_json::Value::deserialize(d)?).map_err(serde::de::Error::custom)
}

fn lenient_total<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    // Derived from the payments on every load, so it is never rejected.
    let value = serde_json::Value::deserialize(d)?;
    Ok(value.as_f64().filter(|n| n.is_finite()).unwrap_or_default())
}

fn lenient_order<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    // Always recomputed; an unusable value only needs to not fail the record.
    let order = value_amount(serde_json::Value::deserialize(d)?)
        .ok()
        .flatten()
        .unwrap_or_default();
    Ok(if order >= 0.0 { order as u32 } else { 0 })
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(lenient_opt_flag(d)?.unwrap_or_default())
}

fn lenient_opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    serde_json::Value::deserialize(d).map(value_flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_input_derives_total_and_defaults_missing_amounts() {
        let input = CandidateInput {
            name: Some("Ahmed".into()),
            first_payment: Some(100.0),
            third_payment: Some(25.5),
            ..Default::default()
        };
        let c = Candidate::from_input("c1".into(), &input);
        assert_eq!(c.id, "c1");
        assert_eq!(c.second_payment, 0.0);
        assert_eq!(c.total_payments, 125.5);
        assert_eq!(c.order, 0);
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut c = Candidate::from_input(
            "c1".into(),
            &CandidateInput {
                name: Some("Ahmed".into()),
                agent: Some("Rabat".into()),
                first_payment: Some(10.0),
                ..Default::default()
            },
        );
        c.apply(&CandidateInput {
            second_payment: Some(5.0),
            ..Default::default()
        });
        assert_eq!(c.name, "Ahmed");
        assert_eq!(c.agent, "Rabat");
        assert_eq!(c.total_payments, 15.0);
    }

    #[test]
    fn input_ignores_derived_keys_and_accepts_string_numbers() {
        let input: CandidateInput = serde_json::from_value(serde_json::json!({
            "id": "forged",
            "order": 1,
            "totalPayments": 9999,
            "name": "Fatima",
            "idNumber": 123456,
            "isReserve": "TRUE",
            "firstPayment": "200",
            "secondPayment": "",
            "thirdPayment": null
        }))
        .expect("input should deserialize");

        assert_eq!(input.name.as_deref(), Some("Fatima"));
        assert_eq!(input.id_number.as_deref(), Some("123456"));
        assert_eq!(input.is_reserve, Some(true));
        assert_eq!(input.first_payment, Some(200.0));
        assert_eq!(input.second_payment, Some(0.0));
        assert_eq!(input.third_payment, None);
    }

    #[test]
    fn stored_document_with_missing_fields_deserializes() {
        let c: Candidate = serde_json::from_value(serde_json::json!({
            "id": "1700000000000",
            "name": "Omar",
            "isReserve": false,
            "firstPayment": 50
        }))
        .expect("candidate should deserialize");
        assert_eq!(c.name, "Omar");
        assert_eq!(c.first_payment, 50.0);
        assert_eq!(c.notes, "");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let c = Candidate::from_input("x".into(), &CandidateInput::default());
        let json = serde_json::to_value(&c).expect("serialize");
        assert!(json.get("totalPayments").is_some());
        assert!(json.get("isReserve").is_some());
        assert!(json.get("passportProfession").is_some());
    }

    #[test]
    fn header_resolution_matches_key_and_label() {
        assert_eq!(Field::from_header("firstPayment"), Some(Field::FirstPayment));
        assert_eq!(Field::from_header(" FIRSTPAYMENT "), Some(Field::FirstPayment));
        assert_eq!(Field::from_header("الاسم"), Some(Field::Name));
        assert_eq!(Field::from_header("unknown"), None);
    }

    #[test]
    fn set_text_rejects_non_numeric_amounts() {
        let mut input = CandidateInput::default();
        assert!(input.set_text(Field::FirstPayment, "").is_ok());
        assert_eq!(input.first_payment, Some(0.0));
        assert_eq!(
            input.set_text(Field::SecondPayment, "abc"),
            Err("abc".to_string())
        );
    }

    #[test]
    fn out_of_range_amounts_are_rejected() {
        assert_eq!(parse_amount("1e308"), Err("1e308".to_string()));
        assert_eq!(parse_amount("inf"), Err("inf".to_string()));
        assert_eq!(parse_amount("-1000000000000000"), Ok(-1e15));

        let input = serde_json::from_value::<CandidateInput>(serde_json::json!({
            "firstPayment": 1e308,
            "secondPayment": 1e308
        }));
        assert!(input.is_err(), "overflowing payments must not deserialize");

        let stored = serde_json::from_value::<Candidate>(serde_json::json!({
            "firstPayment": "1e308"
        }));
        assert!(stored.is_err());
    }

    #[test]
    fn largest_amounts_keep_a_finite_total() {
        let c = Candidate::from_input(
            "big".into(),
            &CandidateInput {
                first_payment: Some(MAX_AMOUNT),
                second_payment: Some(MAX_AMOUNT),
                third_payment: Some(MAX_AMOUNT),
                ..Default::default()
            },
        );
        assert!(c.total_payments.is_finite());
        assert_eq!(c.total_payments, 3.0 * MAX_AMOUNT);
    }

    #[test]
    fn amount_formatting_drops_trailing_zero() {
        assert_eq!(format_amount(150.0), "150");
        assert_eq!(format_amount(12.5), "12.5");
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("yes"));
        assert!(parse_flag("نعم"));
        assert!(!parse_flag("FALSE"));
        assert!(!parse_flag(""));
    }
}
