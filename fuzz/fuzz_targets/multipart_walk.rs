#![no_main]

use libfuzzer_sys::fuzz_target;
use multimime::{get_all_parts, get_text_parts, is_html_part, is_plain_text_part, is_text_part};

fuzz_target!(|data: &[u8]| {
    let all = match get_all_parts(data) {
        Ok(parts) => parts,
        Err(err) => err.parts,
    };
    let text = match get_text_parts(data) {
        Ok(parts) => parts,
        Err(err) => err.parts,
    };

    // text parts are an ordered subsequence of all parts
    let mut rest = all.iter();
    for p in &text {
        assert!(rest.any(|q| q == p));
    }
    for p in &all {
        let h = p.headers();
        assert!(!is_plain_text_part(h) || is_text_part(h));
        assert!(!is_html_part(h) || is_text_part(h));
    }
});
