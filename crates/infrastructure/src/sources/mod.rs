pub mod whoisxml;

pub use whoisxml::WhoisXmlSource;
