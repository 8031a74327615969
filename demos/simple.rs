use std::io::Read;

pub fn main() {
    let input = br#"Date: 7 Mar 2023 08:00:00 +0200
From: mary@example.net
To: someone_else@example.com
Subject: A multipart message
MIME-Version: 1.0
Content-Type: multipart/mixed; boundary="frontier"

This is a message with multiple parts in MIME format.
--frontier
Content-Type: text/plain

This is the plain text body of the message.
--frontier
Content-Type: text/html

<p>This is the <b>html</b> body of the message.</p>
--frontier
Content-Type: application/octet-stream
Content-Disposition: attachment; filename="notes.bin"

PGh0bWw+CiAgPGhlYWQ+CiAgPC9oZWFkPgo=
--frontier--
"#;

    // the easy way: pick the parts you want
    let attachments = multimime::get_attachments(&input[..]).unwrap();
    for part in &attachments {
        println!(
            "attachment {:?} ({}, {} bytes)",
            part.file_name(),
            part.media_type(),
            part.content().len(),
        );
    }
    println!("inline text:{}", multimime::get_inline_text(&input[..]).unwrap());

    // the manual way: walk the parts and only read the bodies you need
    let mut reader = multimime::open_multipart(&input[..]).unwrap();
    while let Some(mut part) = reader.next_part().unwrap() {
        if multimime::is_plain_text_part(part.headers()) {
            let mut body = String::new();
            part.read_to_string(&mut body).unwrap();
            println!("plain text body: {}", body);
        } else {
            println!("skipping a {} part", part.media_type());
        }
    }
}
