//! Line ending helpers.
//!
//! The document stores bytes exactly as inserted and indexes `\n`, `\r\n`,
//! and lone `\r` terminators alike; nothing is normalized. Hosts that care
//! about the convention when saving can detect the dominant one here.

/// A newline convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
    /// Classic Mac CR (`'\r'`).
    Cr,
}

impl LineEnding {
    /// Detect the dominant line ending of `text`.
    ///
    /// Counts each terminator kind and returns the most frequent one,
    /// preferring LF on ties and for texts without terminators.
    pub fn detect_in_text(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut lf = 0usize;
        let mut crlf = 0usize;
        let mut cr = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => lf += 1,
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        crlf += 1;
                        i += 1;
                    } else {
                        cr += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        if crlf > lf && crlf >= cr {
            LineEnding::Crlf
        } else if cr > lf && cr > crlf {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }

    /// The terminator bytes of this convention.
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}
