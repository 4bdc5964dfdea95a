//! Record type schema
//!
//! Static metadata describing each supported DNS record type: how its
//! declarative-file columns map onto canonical field names, how the remote
//! provider names the type, and whether the type takes part in
//! reconciliation. Pure lookup table; no mutable state.

use crate::error::{Error, Result};
use crate::store::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4 address)
    A,
    /// AAAA record (IPv6 address)
    Aaaa,
    /// CNAME record (canonical name)
    Cname,
    /// MX record (mail exchange)
    Mx,
    /// NS record (name server)
    Ns,
    /// PTR record (reverse pointer)
    Ptr,
    /// SRV record (service locator)
    Srv,
    /// TXT record (free text)
    Txt,
}

impl RecordType {
    /// All supported types, in the order the live-DNS snapshot cursor
    /// probes them.
    pub const ALL: [RecordType; 8] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// The DNS type name, as written in the declarative records file
    pub fn name(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }

    /// Parse a declarative-file type name
    pub fn from_name(name: &str) -> Option<RecordType> {
        RecordType::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declarative-file column a canonical field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceColumn {
    /// The `data` column (always required)
    Data,
    /// First extra column (e.g. MX preference, SRV port)
    Extra1,
    /// Second extra column (e.g. SRV weight)
    Extra2,
    /// Third extra column (e.g. SRV priority)
    Extra3,
}

impl SourceColumn {
    /// Column name as it appears in parse errors
    pub fn name(&self) -> &'static str {
        match self {
            SourceColumn::Data => "data",
            SourceColumn::Extra1 => "extra1",
            SourceColumn::Extra2 => "extra2",
            SourceColumn::Extra3 => "extra3",
        }
    }
}

/// How a raw column string is converted into a typed field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldParser {
    /// Keep the raw string
    Text,
    /// Parse as a non-negative integer (priority, weight, port)
    Integer,
}

impl FieldParser {
    /// Apply the parser to a raw column value
    pub fn parse(&self, raw: &str) -> Result<FieldValue> {
        match self {
            FieldParser::Text => Ok(FieldValue::Str(raw.to_string())),
            FieldParser::Integer => raw
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| Error::input(format!("expected an integer, got {raw:?}"))),
        }
    }
}

/// One canonical field of a record type
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical field name (the remote provider's value-object key)
    pub canonical: &'static str,
    /// Declarative-file column the field is read from
    pub column: SourceColumn,
    /// Conversion from the raw column string
    pub parser: FieldParser,
    /// Field name as returned by live DNS resolution, when it differs
    /// from the canonical name
    pub dns_field: Option<&'static str>,
}

/// Static metadata for one record type
#[derive(Debug, Clone, Copy)]
pub struct RecordTypeDescriptor {
    /// The type this descriptor describes
    pub record_type: RecordType,
    /// Ordered canonical field layout; never empty
    pub fields: &'static [FieldSpec],
    /// The remote provider's fully-qualified type identifier
    pub remote_type_name: &'static str,
    /// The key under which the provider nests this type's values
    pub remote_property_name: &'static str,
    /// When true the type is excluded from diffing in both directions
    /// (the provider manages it outside user control)
    pub ignore_in_reconciliation: bool,
}

impl RecordTypeDescriptor {
    /// Look up a field spec by canonical name
    pub fn field(&self, canonical: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }

    /// Reverse field map: the canonical field sourced from a given column.
    /// Used when serializing canonical values back into file rows.
    pub fn canonical_for_column(&self, column: SourceColumn) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.canonical)
    }
}

const fn text_field(canonical: &'static str, column: SourceColumn) -> FieldSpec {
    FieldSpec {
        canonical,
        column,
        parser: FieldParser::Text,
        dns_field: None,
    }
}

const fn int_field(canonical: &'static str, column: SourceColumn) -> FieldSpec {
    FieldSpec {
        canonical,
        column,
        parser: FieldParser::Integer,
        dns_field: None,
    }
}

static A_FIELDS: [FieldSpec; 1] = [text_field("ipv4Address", SourceColumn::Data)];
static AAAA_FIELDS: [FieldSpec; 1] = [text_field("ipv6Address", SourceColumn::Data)];
static CNAME_FIELDS: [FieldSpec; 1] = [text_field("cname", SourceColumn::Data)];
static MX_FIELDS: [FieldSpec; 2] = [
    text_field("exchange", SourceColumn::Data),
    FieldSpec {
        canonical: "preference",
        column: SourceColumn::Extra1,
        parser: FieldParser::Integer,
        // the resolver reports MX preference as "priority"
        dns_field: Some("priority"),
    },
];
static NS_FIELDS: [FieldSpec; 1] = [text_field("nsdname", SourceColumn::Data)];
static PTR_FIELDS: [FieldSpec; 1] = [text_field("ptrdname", SourceColumn::Data)];
static SRV_FIELDS: [FieldSpec; 4] = [
    text_field("target", SourceColumn::Data),
    int_field("port", SourceColumn::Extra1),
    int_field("weight", SourceColumn::Extra2),
    int_field("priority", SourceColumn::Extra3),
];
static TXT_FIELDS: [FieldSpec; 1] = [text_field("value", SourceColumn::Data)];

/// One descriptor per supported type, in [`RecordType::ALL`] order
static DESCRIPTORS: [RecordTypeDescriptor; 8] = [
    RecordTypeDescriptor {
        record_type: RecordType::A,
        fields: &A_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/A",
        remote_property_name: "aRecords",
        ignore_in_reconciliation: false,
    },
    RecordTypeDescriptor {
        record_type: RecordType::Aaaa,
        fields: &AAAA_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/AAAA",
        remote_property_name: "aaaaRecords",
        ignore_in_reconciliation: false,
    },
    RecordTypeDescriptor {
        record_type: RecordType::Cname,
        fields: &CNAME_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/CNAME",
        remote_property_name: "cnameRecords",
        ignore_in_reconciliation: false,
    },
    RecordTypeDescriptor {
        record_type: RecordType::Mx,
        fields: &MX_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/MX",
        remote_property_name: "mxRecords",
        ignore_in_reconciliation: false,
    },
    // Apex NS records are managed by the provider and never diffed.
    RecordTypeDescriptor {
        record_type: RecordType::Ns,
        fields: &NS_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones",
        remote_property_name: "nsRecords",
        ignore_in_reconciliation: true,
    },
    RecordTypeDescriptor {
        record_type: RecordType::Ptr,
        fields: &PTR_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/PTR",
        remote_property_name: "ptrRecords",
        ignore_in_reconciliation: false,
    },
    RecordTypeDescriptor {
        record_type: RecordType::Srv,
        fields: &SRV_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/SRV",
        remote_property_name: "srvRecords",
        ignore_in_reconciliation: false,
    },
    RecordTypeDescriptor {
        record_type: RecordType::Txt,
        fields: &TXT_FIELDS,
        remote_type_name: "Microsoft.Network/dnszones/TXT",
        remote_property_name: "txtRecords",
        ignore_in_reconciliation: false,
    },
];

/// Look up the descriptor for a record type
pub fn descriptor(record_type: RecordType) -> &'static RecordTypeDescriptor {
    // DESCRIPTORS is kept in RecordType::ALL order
    let idx = RecordType::ALL
        .iter()
        .position(|t| *t == record_type)
        .unwrap_or_else(|| unreachable!("descriptor table out of sync"));
    &DESCRIPTORS[idx]
}

/// Resolve a record type from the provider's nested property key
/// (e.g. `aRecords` -> A). Returns `None` for metadata properties.
pub fn type_for_remote_property_name(name: &str) -> Option<RecordType> {
    DESCRIPTORS
        .iter()
        .find(|d| d.remote_property_name == name)
        .map(|d| d.record_type)
}

/// Resolve a record type from the provider's fully-qualified type name.
///
/// Fails with [`Error::UnknownRemoteType`]: an unmatched remote type means
/// the provider introduced a record type this tool cannot safely represent.
pub fn type_for_remote_type_name(name: &str) -> Result<RecordType> {
    DESCRIPTORS
        .iter()
        .find(|d| d.remote_type_name == name)
        .map(|d| d.record_type)
        .ok_or_else(|| Error::unknown_remote_type(name))
}
