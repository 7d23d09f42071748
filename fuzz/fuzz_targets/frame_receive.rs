#![no_main]

use std::io::{self, Read};

use frame::{FrameCodec, FrameLimits};
use libfuzzer_sys::fuzz_target;

/// Hands out the input in pieces whose sizes come from the input itself.
struct Chopped<'a> {
    data: &'a [u8],
    sizes: &'a [u8],
    turn: usize,
}

impl Read for Chopped<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Ok(0);
        }
        let size = self
            .sizes
            .get(self.turn % self.sizes.len().max(1))
            .map_or(1, |&s| usize::from(s % 16) + 1);
        self.turn += 1;
        let n = size.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |&b| usize::from(b) % 8).min(data.len());
    let (sizes, payload) = data.split_at(split);
    let stream = Chopped {
        data: payload,
        sizes,
        turn: 0,
    };
    let mut limits = FrameLimits::for_testing();
    limits.max_frame_bytes = 512;
    let mut codec = FrameCodec::with_limits(stream, limits);

    let mut frames = 0usize;
    while let Ok(frame) = codec.receive() {
        assert!(!frame.contains('\n'));
        frames += 1;
        if frames > payload.len() {
            panic!("more frames than input bytes");
        }
    }
});
