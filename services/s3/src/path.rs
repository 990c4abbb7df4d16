use crate::constants::S3_KEY_ENCODE_SET;
use percent_encoding::utf8_percent_encode;

/// Path-style address of a request target: an optional bucket and an
/// optional object key.
///
/// Bucket names are inserted verbatim; they are validated at creation time
/// by the service and never re-encoded here. Object keys are percent-encoded
/// with the strict key encode set unless [`with_raw_key`][Self::with_raw_key]
/// opts out.
#[derive(Debug, Clone)]
pub struct ObjectPath {
    bucket: Option<String>,
    key: Option<String>,
    encode_key: bool,
}

impl Default for ObjectPath {
    fn default() -> Self {
        Self::root()
    }
}

impl ObjectPath {
    /// Address the service root. Used by account-level calls such as
    /// listing buckets.
    pub fn root() -> Self {
        Self {
            bucket: None,
            key: None,
            encode_key: true,
        }
    }

    /// Address a bucket.
    pub fn bucket(bucket: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            key: None,
            encode_key: true,
        }
    }

    /// Address an object within a bucket.
    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            key: Some(key.into()),
            encode_key: true,
        }
    }

    /// Treat the key as already percent-encoded and insert it verbatim.
    pub fn with_raw_key(mut self) -> Self {
        self.encode_key = false;
        self
    }

    pub(crate) fn has_bucket(&self) -> bool {
        self.bucket.as_deref().is_some_and(|b| !b.is_empty())
    }

    pub(crate) fn has_key(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Render the canonical URI segment.
    ///
    /// An empty path yields `/`. A bucket is prefixed with `/` unless it
    /// already starts with one. A key follows a single `/` separator.
    pub fn canonical_uri(&self) -> String {
        let mut uri = String::with_capacity(32);

        match self.bucket.as_deref() {
            Some(bucket) if !bucket.is_empty() => {
                if !bucket.starts_with('/') {
                    uri.push('/');
                }
                uri.push_str(bucket);
            }
            _ => uri.push('/'),
        }

        if let Some(key) = self.key.as_deref() {
            if !key.is_empty() {
                if !key.starts_with('/') && !uri.ends_with('/') {
                    uri.push('/');
                }
                if self.encode_key {
                    uri.push_str(&utf8_percent_encode(key, &S3_KEY_ENCODE_SET).to_string());
                } else {
                    uri.push_str(key);
                }
            }
        }

        uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(ObjectPath::root().canonical_uri(), "/");
        assert_eq!(ObjectPath::default().canonical_uri(), "/");
        assert_eq!(ObjectPath::bucket("").canonical_uri(), "/");
    }

    #[test_case(ObjectPath::bucket("b"), "/b"; "bucket only")]
    #[test_case(ObjectPath::bucket("/b"), "/b"; "bucket already slash prefixed")]
    #[test_case(ObjectPath::object("b", "k.txt"), "/b/k.txt"; "plain key")]
    #[test_case(ObjectPath::object("b", "/k.txt"), "/b/k.txt"; "key already slash prefixed")]
    #[test_case(ObjectPath::object("b", "a b.txt"), "/b/a%20b.txt"; "space in key")]
    #[test_case(ObjectPath::object("b", "dir/file.txt"), "/b/dir/file.txt"; "separator kept")]
    #[test_case(ObjectPath::object("b", "caf\u{e9}.txt"), "/b/caf%C3%A9.txt"; "utf8 key")]
    #[test_case(ObjectPath::object("b", ""), "/b"; "empty key ignored")]
    fn test_canonical_uri(path: ObjectPath, expected: &str) {
        assert_eq!(path.canonical_uri(), expected);
    }

    /// Characters that general-purpose URI encoders leave untouched must
    /// still be escaped, `#` included.
    #[test]
    fn test_strict_key_encoding() {
        let path = ObjectPath::object("b", "!#$&'()*+,:;=@[]{}");
        assert_eq!(
            path.canonical_uri(),
            "/b/%21%23%24%26%27%28%29%2A%2B%2C%3A%3B%3D%40%5B%5D%7B%7D"
        );

        assert_eq!(ObjectPath::object("b", "a#b").canonical_uri(), "/b/a%23b");
    }

    #[test]
    fn test_raw_key_is_verbatim() {
        let path = ObjectPath::object("b", "a%20b.txt").with_raw_key();
        assert_eq!(path.canonical_uri(), "/b/a%20b.txt");
    }
}
