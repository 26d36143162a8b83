/// Errors that can occur while parsing MAME XML output.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid listing: {0}")]
    InvalidListing(String),
}

impl XmlError {
    pub fn invalid_listing(msg: impl Into<String>) -> Self {
        Self::InvalidListing(msg.into())
    }
}
