use ferrous_recon_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Convert domain RecordType → hickory RecordType (for building queries)
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::NS => HickoryRecordType::NS,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::SOA => HickoryRecordType::SOA,
            RecordType::SRV => HickoryRecordType::SRV,
            RecordType::PTR => HickoryRecordType::PTR,
            // SPF (99) is obsolete and has no dedicated hickory variant.
            RecordType::SPF => HickoryRecordType::Unknown(99),
        }
    }

    /// Convert hickory RecordType → domain RecordType (for parsing responses)
    pub fn from_hickory(record_type: HickoryRecordType) -> Option<RecordType> {
        RecordType::from_u16(u16::from(record_type))
    }
}
