//! DYN byte-shuffle transform
//!
//! Each full 8-byte chunk is XORed with a fixed key and permuted; a trailing
//! chunk shorter than 8 bytes is copied unchanged.

const CHUNK: usize = 8;

const KEY: [u8; CHUNK] = {
    let mut key = [0u8; CHUNK];
    let mut i = 0;
    while i < CHUNK {
        key[i] = 0x8D + i as u8;
        i += 1;
    }
    key
};

const PERMUTATION: [usize; CHUNK] = [5, 3, 6, 7, 4, 2, 0, 1];

/// Zip local-file-header magic; a buffer starting with it was never obfuscated
const ZIP_MAGIC: &[u8; 2] = b"PK";

pub fn is_plain_zip(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Obfuscate `data`
pub fn dyn_encode(data: &[u8]) -> Vec<u8> {
    transform(data, |input, output| {
        for i in 0..CHUNK {
            output[PERMUTATION[i]] = input[i] ^ KEY[i];
        }
    })
}

/// Undo [`dyn_encode`]. Buffers that already look like a zip are returned as is.
pub fn dyn_decode(data: &[u8]) -> Vec<u8> {
    if is_plain_zip(data) {
        return data.to_vec();
    }
    transform(data, |input, output| {
        for i in 0..CHUNK {
            output[i] = input[PERMUTATION[i]] ^ KEY[i];
        }
    })
}

fn transform(data: &[u8], chunk_fn: impl Fn(&[u8], &mut [u8])) -> Vec<u8> {
    let mut out = vec![0u8; data.len()];
    let mut input = data.chunks_exact(CHUNK);
    let mut output = out.chunks_exact_mut(CHUNK);
    for (src, dst) in (&mut input).zip(&mut output) {
        chunk_fn(src, dst);
    }
    output.into_remainder().copy_from_slice(input.remainder());
    out
}
