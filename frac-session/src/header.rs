//! The session header: one fixed set of scalar generation parameters, written once per session.

/// The delimiter line that opens and closes the header block.
pub const HEADER_DELIMITER: &str = "--- HEADER ---";

/// The delimiter line that opens each expression record.
pub const RECORD_DELIMITER: &str = "--- EXPR ---";

pub(crate) mod keys {
    pub const METHOD: &str = "Method";
    pub const METHOD_PARAMS: &str = "Method parameters";
    pub const EPSILON: &str = "Epsilon";
    pub const NORM: &str = "Norm";
    pub const SCALE: &str = "Scale";
    pub const ITERATIONS: &str = "Iterations";
    pub const CENTER_X: &str = "X of center";
    pub const CENTER_Y: &str = "Y of center";
    pub const IMAGE_WIDTH: &str = "Length of image";
    pub const IMAGE_HEIGHT: &str = "Height of image";
}

/// The recognized header keys. Any other key is a hard parse failure.
pub const KEYS: [&str; 10] = [
    keys::METHOD,
    keys::METHOD_PARAMS,
    keys::EPSILON,
    keys::NORM,
    keys::SCALE,
    keys::ITERATIONS,
    keys::CENTER_X,
    keys::CENTER_Y,
    keys::IMAGE_WIDTH,
    keys::IMAGE_HEIGHT,
];

/// The generation parameters persisted at the start of a session.
///
/// Every field is free-form text at this layer; typed interpretation (numeric accuracy, image
/// dimensions, ...) is the consumer's concern. Each of the ten fields must appear exactly once
/// in a well-formed header.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionHeader {
    /// The name of the iterative root-finding method.
    pub method: String,

    /// The method's type parameters, possibly empty.
    pub method_params: String,

    /// The numeric accuracy at which iteration stops.
    pub epsilon: String,

    /// The name of the norm used for convergence checks.
    pub norm: String,

    /// Pixels per graph unit.
    pub scale: String,

    /// The iteration ceiling per point.
    pub iterations: String,

    /// The x coordinate of the image center.
    pub center_x: String,

    /// The y coordinate of the image center.
    pub center_y: String,

    /// The image width, in pixels.
    pub image_width: String,

    /// The image height, in pixels.
    pub image_height: String,
}

/// The default header. Returns a [`SessionHeader`] with the following values:
///
/// - [`method`](SessionHeader::method): `Newton`
/// - [`method_params`](SessionHeader::method_params): empty
/// - [`epsilon`](SessionHeader::epsilon): `0.05`
/// - [`norm`](SessionHeader::norm): `norm2`
/// - [`scale`](SessionHeader::scale): `20.0`
/// - [`iterations`](SessionHeader::iterations): `100`
/// - [`center_x`](SessionHeader::center_x) / [`center_y`](SessionHeader::center_y): `0`
/// - [`image_width`](SessionHeader::image_width) / [`image_height`](SessionHeader::image_height): `1000`
impl Default for SessionHeader {
    fn default() -> SessionHeader {
        SessionHeader {
            method: "Newton".to_string(),
            method_params: String::new(),
            epsilon: "0.05".to_string(),
            norm: "norm2".to_string(),
            scale: "20.0".to_string(),
            iterations: "100".to_string(),
            center_x: "0".to_string(),
            center_y: "0".to_string(),
            image_width: "1000".to_string(),
            image_height: "1000".to_string(),
        }
    }
}
