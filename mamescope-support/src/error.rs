/// Errors that can occur while loading support files.
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] mamescope_xml::XmlError),
}
