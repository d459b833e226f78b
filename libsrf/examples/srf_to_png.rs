//! Decodes an SRF container and saves its combined canvas as a PNG.
//!
//! Usage: `cargo run --example srf_to_png -- vehicle.srf vehicle.png`

use libsrf::SrfImageFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(srf_path), Some(png_path)) = (args.next(), args.next()) else {
        eprintln!("usage: srf_to_png <srf_file> <png_file>");
        std::process::exit(2);
    };

    let srf = SrfImageFile::from_file(&srf_path)?;
    println!(
        "{}: {} section(s), {}x{}",
        srf_path,
        srf.sections().len(),
        srf.width(),
        srf.height()
    );
    srf.into_canvas().save(png_path)?;
    Ok(())
}
