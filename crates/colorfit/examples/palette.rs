//! Show how colors fare at each rank.

use std::io::{self, Write};

use colorfit::termco::{AnsiColor, Color, Rgb};
use colorfit::{Rank, Transcoder, Translator};

const SAMPLES: [Rgb; 4] = [
    Rgb::new(0x6b, 0x50, 0xff),
    Rgb::new(0xff, 0x85, 0x37),
    Rgb::new(0x00, 0x87, 0x5f),
    Rgb::new(0xd0, 0xd0, 0xd0),
];

fn main() -> io::Result<()> {
    let stdout = io::stdout();
    let rank = Rank::for_stream(&stdout);
    let translator = Translator::default();

    let mut out = stdout.lock();
    writeln!(out, "terminal rank: {}", rank)?;
    for sample in SAMPLES {
        let color = Color::Rgb(sample);
        writeln!(
            out,
            "{}  256: {:?}  16: {:?}",
            sample,
            translator.convert(Rank::Extended256, &color),
            translator.convert(Rank::Basic16, &color),
        )?;
    }

    let mut transcoder = Transcoder::new(out, rank);
    for ansi in AnsiColor::all() {
        write!(transcoder, "\x1b[48;5;{}m  \x1b[m ", u8::from(ansi))?;
        if ansi == AnsiColor::White {
            writeln!(transcoder)?;
        }
    }
    writeln!(transcoder)?;
    transcoder.finish()?;
    Ok(())
}
