#![no_main]

use libfuzzer_sys::fuzz_target;
use tyber::{Mode, codec};

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let decoded = codec::decode(data.to_vec(), None, mode);
        if let Ok((value, _)) = decoded {
            // Whatever decodes must re-encode.
            if mode == Mode::Der {
                let _ = codec::der::encode(&value).unwrap();
            }
            else {
                let _ = codec::encode(
                    &value, &codec::EncodeOptions::ber()
                ).unwrap();
            }
        }
    }
});
