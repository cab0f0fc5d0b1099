pub mod hash;
pub mod ip;
pub mod request;
pub mod url;

pub use hash::{destination_url_hash, fingerprint_hash, ip_hash, sha256_hex};
pub use ip::{generalize_ip, is_private_or_local};
pub use request::{extract_client_ip, request_origin};
pub use url::{is_web_url, normalize_base_url, referrer_host, tracer_url};
