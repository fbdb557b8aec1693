#![forbid(unsafe_code)]

//! Digest (hash) helpers.

use digest::Digest;

/// Hash algorithms the verifier computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

/// Compute a digest in one shot.
pub fn digest(alg: HashAlg, data: &[u8]) -> Vec<u8> {
    match alg {
        HashAlg::Sha1 => sha1::Sha1::digest(data).to_vec(),
        HashAlg::Sha256 => sha2::Sha256::digest(data).to_vec(),
        HashAlg::Sha384 => sha2::Sha384::digest(data).to_vec(),
        HashAlg::Sha512 => sha2::Sha512::digest(data).to_vec(),
    }
}

/// SHA-256 of `data`, hex-encoded.
///
/// Digest comparison in the pipeline is defined over hex encodings with
/// exact equality.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest(HashAlg::Sha256, data))
}

/// SHA-1 of `data`, hex-encoded. Used for the OCSP nonce binding.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(digest(HashAlg::Sha1, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha1_known_vector() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(digest(HashAlg::Sha1, b"x").len(), 20);
        assert_eq!(digest(HashAlg::Sha256, b"x").len(), 32);
        assert_eq!(digest(HashAlg::Sha384, b"x").len(), 48);
        assert_eq!(digest(HashAlg::Sha512, b"x").len(), 64);
    }
}
