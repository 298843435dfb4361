use thiserror::Error;

/// Errors produced when turning a conversion ratio into a number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatioError {
    #[error("conversion ratio denominator is zero")]
    ZeroDenominator,
    #[error("invalid decimal {value:?} in conversion ratio: {reason}")]
    InvalidDecimal { value: String, reason: String },
    #[error("conversion ratio {numerator}/{denominator} is not positive")]
    NonPositive {
        numerator: String,
        denominator: String,
    },
}

/// Errors produced while decoding raw OCF objects into [`crate::OcfRecord`]s.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid {object_type} record: {source}")]
    InvalidRecord {
        object_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while consuming records into a [`crate::Model`].
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("stock class {stock_class_id}: {source}")]
    ConversionRatio {
        stock_class_id: String,
        #[source]
        source: RatioError,
    },
}
