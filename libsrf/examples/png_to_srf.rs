//! Encodes a PNG as a single-section SRF container.
//!
//! Usage: `cargo run --example png_to_srf -- vehicle.png vehicle.srf`

use libsrf::SrfImageFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(png_path), Some(srf_path)) = (args.next(), args.next()) else {
        eprintln!("usage: png_to_srf <png_file> <srf_file>");
        std::process::exit(2);
    };

    let img = image::open(png_path)?.to_rgba8();
    let dims = (
        u16::try_from(img.width()).expect("width is too big"),
        u16::try_from(img.height()).expect("height is too big"),
    );

    let srf = SrfImageFile::from_canvas(img, &[dims])?;
    srf.into_file(srf_path)?;
    Ok(())
}
