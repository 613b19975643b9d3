// -*- mode: rust; -*-
//
// This file is part of ledger-ed25519.
// See LICENSE for licensing information.

//! Integration tests for ledger-ed25519.

use ledger_ed25519::*;

#[cfg(test)]
mod vectors {
    use super::*;

    /// RFC 8032 §7.1 test vectors: (seed, public key, message,
    /// signature), all hex-encoded.
    ///
    /// TEST 1 (empty message), TEST 2 (one byte), TEST 3 (two bytes),
    /// TEST 1024 (1023 bytes).
    static RFC8032_VECTORS: [(&str, &str, &str, &str); 4] = [
        (
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
            "",
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
        ),
        (
            "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb",
            "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c",
            "72",
            "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00",
        ),
        (
            "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7",
            "fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025",
            "af82",
            "6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a",
        ),
        (
            "f5e5767cf153319517630f226876b86c8160cc583bc013744c6bf255f5cc0ee5",
            "278117fc144c72340f67d0f2316e8386ceffbf2b2428c9c51fef7c597f1d426e",
            "08b8b2b733424243760fe426a4b54908632110a66c2f6591eabd3345e3e4eb98fa6e264bf09efe12ee50f8f54e9f77b1e355f6c50544e23fb1433ddf73be84d879de7c0046dc4996d9e773f4bc9efe5738829adb26c81b37c93a1b270b20329d658675fc6ea534e0810a4432826bf58c941efb65d57a338bbd2e26640f89ffbc1a858efcb8550ee3a5e1998bd177e93a7363c344fe6b199ee5d02e82d522c4feba15452f80288a821a579116ec6dad2b3b310da903401aa62100ab5d1a36553e06203b33890cc9b832f79ef80560ccb9a39ce767967ed628c6ad573cb116dbefefd75499da96bd68a8a97b928a8bbc103b6621fcde2beca1231d206be6cd9ec7aff6f6c94fcd7204ed3455c68c83f4a41da4af2b74ef5c53f1d8ac70bdcb7ed185ce81bd84359d44254d95629e9855a94a7c1958d1f8ada5d0532ed8a5aa3fb2d17ba70eb6248e594e1a2297acbbb39d502f1a8c6eb6f1ce22b3de1a1f40cc24554119a831a9aad6079cad88425de6bde1a9187ebb6092cf67bf2b13fd65f27088d78b7e883c8759d2c4f5c65adb7553878ad575f9fad878e80a0c9ba63bcbcc2732e69485bbc9c90bfbd62481d9089beccf80cfe2df16a2cf65bd92dd597b0707e0917af48bbb75fed413d238f5555a7a569d80c3414a8d0859dc65a46128bab27af87a71314f318c782b23ebfe808b82b0ce26401d2e22f04d83d1255dc51addd3b75a2b1ae0784504df543af8969be3ea7082ff7fc9888c144da2af58429ec96031dbcad3dad9af0dcbaaaf268cb8fcffead94f3c7ca495e056a9b47acdb751fb73e666c6c655ade8297297d07ad1ba5e43f1bca32301651339e22904cc8c42f58c30c04aafdb038dda0847dd988dcda6f3bfd15c4b4c4525004aa06eeff8ca61783aacec57fb3d1f92b0fe2fd1a85f6724517b65e614ad6808d6f6ee34dff7310fdc82aebfd904b01e1dc54b2927094b2db68d6f903b68401adebf5a7e08d78ff4ef5d63653a65040cf9bfd4aca7984a74d37145986780fc0b16ac451649de6188a7dbdf191f64b5fc5e2ab47b57f7f7276cd419c17a3ca8e1b939ae49e488acba6b965610b5480109c8b17b80e1b7b750dfc7598d5d5011fd2dcc5600a32ef5b52a1ecc820e308aa342721aac0943bf6686b64b2579376504ccc493d97e6aed3fb0f9cd71a43dd497f01f17c0e2cb3797aa2a2f256656168e6c496afc5fb93246f6b1116398a346f1a641f3b041e989f7914f90cc2c7fff357876e506b50d334ba77c225bc307ba537152f3f1610e4eafe595f6d9d90d11faa933a15ef1369546868a7f3a45a96768d40fd9d03412c091c6315cf4fde7cb68606937380db2eaaa707b4c4185c32eddcdd306705e4dc1ffc872eeee475a64dfac86aba41c0618983f8741c5ef68d3a101e8a3b8cac60c905c15fc910840b94c00a0b9d0",
            "0aab4c900501b3e24d7cdf4663326a3a87df5e4843b2cbdb67cbf6e460fec350aa5371b1508f9f4528ecea23c436d94b5e8fcd4f681e30a6ac00a9704a188a03",
        ),
    ];

    #[test]
    fn rfc8032_key_derivation() {
        for (seed_hex, public_hex, _, _) in RFC8032_VECTORS.iter() {
            let seed = hex::decode(seed_hex).unwrap();
            let expected_public = hex::decode(public_hex).unwrap();

            let keypair = Keypair::from_seed(&seed).unwrap();
            assert_eq!(&keypair.public.as_bytes()[..], &expected_public[..]);
            assert_eq!(
                &keypair.private.as_bytes()[..32],
                &seed[..],
                "private key must start with the seed"
            );
            assert_eq!(
                &keypair.private.as_bytes()[32..],
                &expected_public[..],
                "private key must end with the public key"
            );
        }
    }

    #[test]
    fn rfc8032_signatures() {
        for (seed_hex, public_hex, message_hex, signature_hex) in RFC8032_VECTORS.iter() {
            let seed = hex::decode(seed_hex).unwrap();
            let public = hex::decode(public_hex).unwrap();
            let message = hex::decode(message_hex).unwrap();
            let expected_signature = hex::decode(signature_hex).unwrap();

            let produced = sign(
                PrivateKey::from_seed(&seed).unwrap().as_bytes(),
                &message,
            )
            .unwrap();
            assert_eq!(&produced[..], &expected_signature[..]);

            assert!(verify(&public, &message, &produced));
            assert!(Zip215::verify(&public, &message, &produced));
        }
    }
}

#[cfg(test)]
mod behavior {
    use super::*;

    /// A deterministic spread of seeds and messages.
    fn cases() -> Vec<(Keypair, Vec<u8>)> {
        let mut cases = Vec::new();
        for i in 0u8..8 {
            let seed = [i.wrapping_mul(37).wrapping_add(1); 32];
            let message: Vec<u8> = (0..(i as usize * 11))
                .map(|j| (j as u8).wrapping_mul(13).wrapping_add(i))
                .collect();
            cases.push((Keypair::from_seed(&seed).unwrap(), message));
        }
        cases
    }

    #[test]
    fn sign_verify_agreement() {
        for (keypair, message) in cases() {
            let signature = keypair.sign(&message).to_bytes();
            assert!(verify(keypair.public.as_bytes(), &message, &signature));
            assert!(Zip215::verify(
                keypair.public.as_bytes(),
                &message,
                &signature
            ));
        }
    }

    #[test]
    fn tampered_message_is_rejected() {
        let keypair = Keypair::from_seed(&[11u8; 32]).unwrap();
        let message = b"transfer 100 tokens to alice".to_vec();
        let signature = keypair.sign(&message).to_bytes();

        for byte in 0..message.len() {
            for bit in [0u8, 3, 7] {
                let mut tampered = message.clone();
                tampered[byte] ^= 1 << bit;
                assert!(!verify(
                    keypair.public.as_bytes(),
                    &tampered,
                    &signature
                ));
            }
        }
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let keypair = Keypair::from_seed(&[13u8; 32]).unwrap();
        let message = b"milestone 42";
        let signature = keypair.sign(message).to_bytes();

        for byte in 0..signature.len() {
            let mut tampered = signature;
            tampered[byte] ^= 1;
            // Either the signature fails to parse (reserved bits) or
            // verification fails; it must never verify.
            assert!(!verify(keypair.public.as_bytes(), message, &tampered));
        }
    }

    #[test]
    fn tampered_public_key_is_rejected() {
        let keypair = Keypair::from_seed(&[17u8; 32]).unwrap();
        let message = b"attestation";
        let signature = keypair.sign(message).to_bytes();

        for byte in 0..32 {
            let mut tampered = *keypair.public.as_bytes();
            tampered[byte] ^= 1;
            assert!(!verify(&tampered, message, &signature));
        }
    }

    /// Replace s with s + l (mod 2^256).  The resulting signature
    /// satisfies the same curve equation, so only the canonicity bound
    /// on s rejects it.
    #[test]
    fn malleated_signature_is_rejected() {
        // Little-endian bytes of l.
        let l: [u8; 32] = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58,
            0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
        ];

        let keypair = Keypair::from_seed(&[23u8; 32]).unwrap();
        let message = b"malleability check";
        let mut signature = keypair.sign(message).to_bytes();
        assert!(verify(keypair.public.as_bytes(), message, &signature));

        // s += l, with carry.
        let mut carry = 0u16;
        for i in 0..32 {
            let sum = signature[32 + i] as u16 + l[i] as u16 + carry;
            signature[32 + i] = sum as u8;
            carry = sum >> 8;
        }
        assert_eq!(carry, 0, "s + l must still fit in 32 bytes");

        assert!(!verify(keypair.public.as_bytes(), message, &signature));
        // ZIP215 requires s < l as well.
        assert!(!Zip215::verify(keypair.public.as_bytes(), message, &signature));
    }

    #[test]
    fn fail_closed_on_malformed_inputs() {
        let keypair = Keypair::from_seed(&[29u8; 32]).unwrap();
        let message = b"m";
        let signature = keypair.sign(message).to_bytes();

        // Wrong-length public keys.
        assert!(!verify(&[], message, &signature));
        assert!(!verify(&signature[..31], message, &signature));
        assert!(!verify(&signature[..33], message, &signature));
        // Wrong-length signatures.
        assert!(!verify(keypair.public.as_bytes(), message, &[]));
        assert!(!verify(keypair.public.as_bytes(), message, &signature[..63]));
        // Reserved bits in the final byte of s.
        let mut reserved = signature;
        reserved[63] |= 0xe0;
        assert!(!verify(keypair.public.as_bytes(), message, &reserved));
        assert!(!Zip215::verify(keypair.public.as_bytes(), message, &reserved));
    }

    #[test]
    fn generated_keypairs_sign_and_verify() {
        use rand::rngs::OsRng;

        let mut csprng = OsRng;
        let keypair = Keypair::generate(&mut csprng);
        let message = b"fresh keys";
        let signature = keypair.sign(message).to_bytes();
        assert!(verify(keypair.public.as_bytes(), message, &signature));
    }
}

#[cfg(test)]
mod zip215_divergence {
    use super::*;

    /// The canonical encoding of the identity point: a valid public
    /// key whose every multiple is the identity.
    static IDENTITY_PK: [u8; 32] = [
        1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    /// A non-canonical encoding: the little-endian bytes of p itself,
    /// which decompress (mod p) to the small-order point with y = 0.
    static NON_CANONICAL_SMALL_ORDER_R: [u8; 32] = [
        0xed, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
    ];

    /// With A the identity and s = 0, the recomputed point
    /// R' = k·(-A) + s·B is the identity for every message, which is
    /// cofactor-equal (but not byte-equal) to the claimed small-order
    /// R.  ZIP215 accepts; RFC 8032 re-encodes R' canonically and
    /// rejects the non-canonical claimed bytes.
    #[test]
    fn zip215_accepts_what_rfc8032_rejects() {
        let mut signature = [0u8; 64];
        signature[..32].copy_from_slice(&NON_CANONICAL_SMALL_ORDER_R);
        // s stays zero, which is canonical.

        let message = b"consensus divergence";

        assert!(Zip215::verify(&IDENTITY_PK, message, &signature));
        assert!(!verify(&IDENTITY_PK, message, &signature));
    }

    /// The two procedures agree on honestly generated signatures, for
    /// any message.
    #[test]
    fn zip215_agrees_on_honest_signatures() {
        for seed_byte in [3u8, 59, 120] {
            let keypair = Keypair::from_seed(&[seed_byte; 32]).unwrap();
            let message = [seed_byte; 40];
            let signature = keypair.sign(&message).to_bytes();
            assert!(verify(keypair.public.as_bytes(), &message, &signature));
            assert!(Zip215::verify(
                keypair.public.as_bytes(),
                &message,
                &signature
            ));
        }
    }
}
