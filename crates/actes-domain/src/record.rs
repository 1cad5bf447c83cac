//! Record module - per-page payloads and the final output row

/// Column headers of the exported table, in fixed order
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "Name",
    "Date Of Death",
    "Declarant Name",
    "City",
    "Street",
    "Phone",
    "Email",
    "Status",
    "Image",
];

/// Raw per-page payload returned by the extraction oracle
///
/// Every field is optional: the oracle is best-effort and may leave any of
/// them blank. Blank strings are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Full name of the deceased person
    pub full_name: Option<String>,

    /// Date of death, `dd/mm/yyyy` as supplied by the oracle (not validated)
    pub date_of_death: Option<String>,

    /// Name of the person who declared the death
    pub declarant_name: Option<String>,

    /// City associated with the declarant
    pub city: Option<String>,

    /// House number and street associated with the declarant
    pub street: Option<String>,
}

impl ExtractedFields {
    /// Keep a field only if it carries something other than whitespace
    pub fn field(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Name of the deceased, if the oracle produced a usable one
    pub fn name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Best-effort contact pair produced by the contact resolver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactResult {
    /// Phone number, if known
    pub phone: Option<String>,

    /// Email address, if known
    pub email: Option<String>,
}

impl ContactResult {
    /// Create a contact result, dropping blank values
    pub fn new(phone: Option<String>, email: Option<String>) -> Self {
        Self {
            phone: ExtractedFields::field(phone),
            email: ExtractedFields::field(email),
        }
    }

    /// A result with neither phone nor email
    pub fn none() -> Self {
        Self::default()
    }

    /// True when at least one field is set
    pub fn is_found(&self) -> bool {
        self.phone.is_some() || self.email.is_some()
    }
}

/// Follow-up state of a record in the destination spreadsheet
///
/// The pipeline only ever writes [`RecordStatus::Pending`]; the other values
/// are set by hand downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordStatus {
    /// Letter still has to be sent
    #[default]
    Pending,

    /// Letter drafted
    Draft,

    /// Letter sent
    Sent,

    /// Contact could not be found
    NotFound,
}

impl RecordStatus {
    /// All statuses, in the order they are offered downstream
    pub const ALL: [RecordStatus; 4] = [
        RecordStatus::Pending,
        RecordStatus::Draft,
        RecordStatus::Sent,
        RecordStatus::NotFound,
    ];

    /// Label written to the destination
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "à envoyer",
            RecordStatus::Draft => "draft",
            RecordStatus::Sent => "envoyé",
            RecordStatus::NotFound => "pas trouvé",
        }
    }

    /// Parse a status from its label
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s.trim())
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final, contact-enriched row for one page image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Full name of the deceased
    pub full_name: String,
    /// Date of death as extracted
    pub date_of_death: Option<String>,
    /// Declarant name as extracted
    pub declarant_name: Option<String>,
    /// Declarant city as extracted
    pub city: Option<String>,
    /// Declarant street as extracted
    pub street: Option<String>,
    /// Resolved phone
    pub phone: Option<String>,
    /// Resolved email
    pub email: Option<String>,
    /// Follow-up status, always pending when produced by the pipeline
    pub status: RecordStatus,
    /// Link or identifier of the published page image
    pub image_reference: String,
}

impl OutputRecord {
    /// Cell values in [`OUTPUT_COLUMNS`] order; absent values become empty cells
    pub fn cells(&self) -> [String; 9] {
        let cell = |v: &Option<String>| v.clone().unwrap_or_default();
        [
            self.full_name.clone(),
            cell(&self.date_of_death),
            cell(&self.declarant_name),
            cell(&self.city),
            cell(&self.street),
            cell(&self.phone),
            cell(&self.email),
            self.status.as_str().to_string(),
            self.image_reference.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_absent() {
        assert_eq!(ExtractedFields::field(Some("   ".to_string())), None);
        assert_eq!(ExtractedFields::field(Some(" Lyon ".to_string())), Some("Lyon".to_string()));

        let fields = ExtractedFields {
            full_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.name(), None);
    }

    #[test]
    fn test_contact_result_found() {
        assert!(!ContactResult::none().is_found());
        assert!(!ContactResult::new(Some(String::new()), None).is_found());
        assert!(ContactResult::new(Some("0102030405".into()), None).is_found());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RecordStatus::default(), RecordStatus::Pending);
        assert_eq!(RecordStatus::Pending.as_str(), "à envoyer");
        for status in RecordStatus::ALL {
            assert_eq!(RecordStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RecordStatus::parse("unknown"), None);
    }

    #[test]
    fn test_cells_follow_column_order() {
        let record = OutputRecord {
            full_name: "jean DUPONT".into(),
            date_of_death: Some("01/02/2024".into()),
            declarant_name: None,
            city: Some("Lyon".into()),
            street: Some("3 rue Neuve".into()),
            phone: Some("0102030405".into()),
            email: None,
            status: RecordStatus::Pending,
            image_reference: "ref-1".into(),
        };

        let cells = record.cells();
        assert_eq!(cells.len(), OUTPUT_COLUMNS.len());
        assert_eq!(cells[0], "jean DUPONT");
        assert_eq!(cells[2], "");
        assert_eq!(cells[7], "à envoyer");
        assert_eq!(cells[8], "ref-1");
    }
}
