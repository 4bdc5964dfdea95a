// # Live DNS Resolver
//
// DnsResolver implementation backed by hickory-resolver. Used by snapshot
// mode, which bootstraps a records file from what a zone currently serves.
//
// - One lookup per call; no caching beyond hickory's own
// - NODATA and NXDOMAIN map to ResolveError::NoData (the snapshot driver
//   treats them as empty results)
// - Every other failure maps to ResolveError::Failed and aborts the snapshot

use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::{self, RData};
use hickory_resolver::TokioAsyncResolver;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use zonesync_core::error::{Error, Result};
use zonesync_core::schema::RecordType;
use zonesync_core::store::FieldValue;
use zonesync_core::traits::{DnsResolver, ResolveError, ResolvedRecord};

/// DnsResolver backed by hickory's Tokio resolver
pub struct LiveResolver {
    resolver: TokioAsyncResolver,
}

impl LiveResolver {
    /// Resolver using the host's DNS configuration (/etc/resolv.conf)
    pub fn from_system() -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| Error::config(format!("cannot read system DNS configuration: {e}")))?;
        Ok(Self { resolver })
    }

    /// Resolver pinned to one name server over UDP port 53.
    ///
    /// Snapshots are usually taken against the zone's authoritative server
    /// so intermediate caches cannot skew the result.
    pub fn with_nameserver(address: IpAddr) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(
            SocketAddr::new(address, 53),
            Protocol::Udp,
        ));

        let resolver = TokioAsyncResolver::tokio(config, ResolverOpts::default());
        Self { resolver }
    }
}

fn to_hickory_type(record_type: RecordType) -> rr::RecordType {
    match record_type {
        RecordType::A => rr::RecordType::A,
        RecordType::Aaaa => rr::RecordType::AAAA,
        RecordType::Cname => rr::RecordType::CNAME,
        RecordType::Mx => rr::RecordType::MX,
        RecordType::Ns => rr::RecordType::NS,
        RecordType::Ptr => rr::RecordType::PTR,
        RecordType::Srv => rr::RecordType::SRV,
        RecordType::Txt => rr::RecordType::TXT,
    }
}

/// Drop the FQDN trailing dot; canonical values are stored without it
fn trim_dot(name: String) -> String {
    name.strip_suffix('.').map(str::to_string).unwrap_or(name)
}

/// Convert one answer's rdata into the canonical resolver shape. Types this
/// tool does not manage yield `None` and are skipped.
fn convert_rdata(rdata: &RData) -> Option<ResolvedRecord> {
    match rdata {
        RData::A(a) => Some(ResolvedRecord::Scalar(a.to_string())),
        RData::AAAA(aaaa) => Some(ResolvedRecord::Scalar(aaaa.to_string())),
        RData::CNAME(cname) => Some(ResolvedRecord::Scalar(trim_dot(cname.0.to_utf8()))),
        RData::NS(ns) => Some(ResolvedRecord::Scalar(trim_dot(ns.0.to_utf8()))),
        RData::PTR(ptr) => Some(ResolvedRecord::Scalar(trim_dot(ptr.0.to_utf8()))),
        RData::MX(mx) => {
            let mut fields = BTreeMap::new();
            fields.insert(
                "exchange".to_string(),
                FieldValue::Str(trim_dot(mx.exchange().to_utf8())),
            );
            fields.insert("priority".to_string(), FieldValue::Int(i64::from(mx.preference())));
            Some(ResolvedRecord::Fields(fields))
        }
        RData::SRV(srv) => {
            let mut fields = BTreeMap::new();
            fields.insert(
                "target".to_string(),
                FieldValue::Str(trim_dot(srv.target().to_utf8())),
            );
            fields.insert("port".to_string(), FieldValue::Int(i64::from(srv.port())));
            fields.insert("weight".to_string(), FieldValue::Int(i64::from(srv.weight())));
            fields.insert("priority".to_string(), FieldValue::Int(i64::from(srv.priority())));
            Some(ResolvedRecord::Fields(fields))
        }
        RData::TXT(txt) => Some(ResolvedRecord::Text(
            txt.iter()
                .map(|segment| String::from_utf8_lossy(segment).into_owned())
                .collect(),
        )),
        _ => None,
    }
}

#[async_trait::async_trait]
impl DnsResolver for LiveResolver {
    async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> std::result::Result<Vec<ResolvedRecord>, ResolveError> {
        let rtype = to_hickory_type(record_type);

        tracing::debug!(%name, %record_type, "resolving");

        let lookup = self.resolver.lookup(name, rtype).await.map_err(|e| {
            match e.kind() {
                // covers both NODATA and NXDOMAIN
                ResolveErrorKind::NoRecordsFound { .. } => ResolveError::NoData,
                _ => ResolveError::Failed(e.to_string()),
            }
        })?;

        // Lookups through a CNAME chain also carry the chain records;
        // only answers of the requested type count.
        let answers = lookup
            .record_iter()
            .filter(|record| record.record_type() == rtype)
            .filter_map(|record| record.data().and_then(convert_rdata))
            .collect();

        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::rr::rdata;
    use hickory_resolver::proto::rr::Name;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    #[test]
    fn every_supported_type_maps_to_a_hickory_type() {
        for record_type in RecordType::ALL {
            assert_eq!(to_hickory_type(record_type).to_string(), record_type.name());
        }
    }

    #[test]
    fn names_lose_their_trailing_dot() {
        assert_eq!(trim_dot("mail.example.com.".to_string()), "mail.example.com");
        assert_eq!(trim_dot("mail.example.com".to_string()), "mail.example.com");
    }

    #[test]
    fn a_records_convert_to_scalars() {
        let converted = convert_rdata(&RData::A(rdata::A(Ipv4Addr::new(1, 2, 3, 4)))).unwrap();
        assert_eq!(converted, ResolvedRecord::Scalar("1.2.3.4".to_string()));
    }

    #[test]
    fn mx_records_convert_to_priority_and_exchange_fields() {
        let exchange = Name::from_str("mail.example.com.").unwrap();
        let converted = convert_rdata(&RData::MX(rdata::MX::new(10, exchange))).unwrap();

        let ResolvedRecord::Fields(fields) = converted else {
            panic!("expected fields");
        };
        assert_eq!(
            fields.get("exchange"),
            Some(&FieldValue::Str("mail.example.com".to_string()))
        );
        assert_eq!(fields.get("priority"), Some(&FieldValue::Int(10)));
    }

    #[test]
    fn srv_records_convert_to_four_fields() {
        let target = Name::from_str("sip.example.com.").unwrap();
        let converted = convert_rdata(&RData::SRV(rdata::SRV::new(10, 20, 5060, target))).unwrap();

        let ResolvedRecord::Fields(fields) = converted else {
            panic!("expected fields");
        };
        assert_eq!(fields.get("priority"), Some(&FieldValue::Int(10)));
        assert_eq!(fields.get("weight"), Some(&FieldValue::Int(20)));
        assert_eq!(fields.get("port"), Some(&FieldValue::Int(5060)));
        assert_eq!(
            fields.get("target"),
            Some(&FieldValue::Str("sip.example.com".to_string()))
        );
    }

    #[test]
    fn txt_records_keep_their_segments() {
        let txt = rdata::TXT::new(vec!["v=spf1 ".to_string(), "-all".to_string()]);
        let converted = convert_rdata(&RData::TXT(txt)).unwrap();
        assert_eq!(
            converted,
            ResolvedRecord::Text(vec!["v=spf1 ".to_string(), "-all".to_string()])
        );
    }
}
