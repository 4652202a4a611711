//! Safe-prime parameter sets shared by both peers
//!
//! Each group modulus is a safe prime (N = 2q+1 with q prime), so the
//! multiplicative group mod N has no small subgroups. The table is built
//! once and never mutated.

use digest::Digest;
use lazy_static::lazy_static;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::bigint::ZkNum;

/// RFC 3526 group 14 modulus, a 2048-bit safe prime with generator 2.
const N_2048_HEX: &str = "\
FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

/// 256-bit safe prime with generator 7, as deployed by the WoW family of
/// SRP-6 servers.
const N_256_HEX: &str = "894B645E89E1535BBDAD5B8B290650530801B18EBFBF5E8FAB3C82872A3E9BB7";

lazy_static! {
    static ref GROUP_256: ZkGroup = ZkGroup {
        n: ZkNum::from_bytes_be(&hex_const(N_256_HEX)),
        g: ZkNum::from_u32(7),
    };

    /// 1024-bit safe prime with generator 2 (the group used by the firebird
    /// wire protocol's Srp plugin).
    static ref GROUP_1024: ZkGroup = ZkGroup {
        n: ZkNum::from_bytes_be(&[
            230, 125, 46, 153, 75, 47, 144, 12, 63, 65, 240, 143, 91, 178, 98, 126, 208, 212, 158,
            225, 254, 118, 122, 82, 239, 205, 86, 92, 214, 231, 104, 129, 44, 62, 30, 156, 232,
            240, 168, 190, 166, 203, 19, 205, 41, 221, 235, 247, 169, 109, 74, 147, 181, 93, 72,
            141, 240, 153, 161, 92, 137, 220, 176, 100, 7, 56, 235, 44, 189, 217, 168, 247, 186,
            181, 97, 171, 27, 13, 193, 198, 205, 171, 243, 3, 38, 74, 8, 209, 188, 169, 50, 209,
            241, 238, 66, 139, 97, 157, 151, 15, 52, 42, 186, 154, 101, 121, 59, 139, 47, 4, 26,
            229, 54, 67, 80, 193, 111, 115, 95, 86, 236, 188, 168, 123, 213, 123, 41, 231,
        ]),
        g: ZkNum::from_u32(2),
    };

    static ref GROUP_2048: ZkGroup = ZkGroup {
        n: ZkNum::from_bytes_be(&hex_const(N_2048_HEX)),
        g: ZkNum::from_u32(2),
    };
}

fn hex_const(s: &str) -> Vec<u8> {
    // Only ever called on the literals above
    hex::decode(s).expect("invalid group constant")
}

/// Strength identifier for a parameter set; the discriminant is the bit
/// length of the modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Strength {
    Bits256 = 256,
    Bits1024 = 1024,
    Bits2048 = 2048,
}

/// Group parameters shared between client and server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkGroup {
    /// A large safe prime (N = 2q+1, where q is prime)
    pub n: ZkNum,
    /// A generator modulo N
    pub g: ZkNum,
}

impl ZkGroup {
    pub fn for_strength(strength: Strength) -> &'static ZkGroup {
        match strength {
            Strength::Bits256 => &GROUP_256,
            Strength::Bits1024 => &GROUP_1024,
            Strength::Bits2048 => &GROUP_2048,
        }
    }

    /// Byte length of the modulus; the width protocol values are padded to
    /// before hashing.
    pub fn n_len(&self) -> usize {
        ((self.n.bits() + 7) / 8) as usize
    }

    /// SRP-6a multiplier `k = H(N | PAD(g))`
    pub fn compute_k<D: Digest>(&self) -> ZkNum {
        let n = self.n.to_bytes_be();
        let g = self.g.to_padded_bytes_be(n.len());

        ZkNum::from_bytes_be(&D::new().chain(&n).chain(&g).finalize())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sha2::Sha256;
    use std::convert::TryFrom;

    #[test]
    fn moduli_have_declared_bit_lengths() {
        assert_eq!(ZkGroup::for_strength(Strength::Bits256).n.bits(), 256);
        assert_eq!(ZkGroup::for_strength(Strength::Bits1024).n.bits(), 1024);
        assert_eq!(ZkGroup::for_strength(Strength::Bits2048).n.bits(), 2048);
    }

    #[test]
    fn strength_maps_to_bit_length() {
        assert_eq!(u32::from(Strength::Bits1024), 1024);
        assert_eq!(Strength::try_from(256u32).unwrap(), Strength::Bits256);
        assert!(Strength::try_from(512u32).is_err());
    }

    #[test]
    fn k_is_stable_and_nonzero() {
        let group = ZkGroup::for_strength(Strength::Bits1024);
        let k1 = group.compute_k::<Sha256>();
        let k2 = group.compute_k::<Sha256>();
        assert!(!k1.is_zero());
        assert_eq!(k1, k2);
    }

    #[test]
    fn k_differs_between_groups() {
        let k256 = ZkGroup::for_strength(Strength::Bits256).compute_k::<Sha256>();
        let k1024 = ZkGroup::for_strength(Strength::Bits1024).compute_k::<Sha256>();
        assert_ne!(k256, k1024);
    }

    #[test]
    fn moduli_are_odd() {
        for strength in [Strength::Bits256, Strength::Bits1024, Strength::Bits2048] {
            let n = &ZkGroup::for_strength(strength).n;
            let last = *n.to_bytes_be().last().unwrap();
            assert_eq!(last & 1, 1);
        }
    }
}
