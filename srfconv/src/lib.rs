use std::{
    ffi::OsString,
    fs,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Result;
use libsrf::{container::verify_reader, Error, Sidecar, SrfImageFile};
use tracing::{debug, info, instrument};

/// Appends a raw suffix (extension or companion-file tail) to a base path
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Strips a trailing `.png` off a base name the user helpfully added
fn strip_png_ext(base: &Path) -> PathBuf {
    if base
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
    {
        info!("note: stripping '.png' off the end of the image base name");
        base.with_extension("")
    } else {
        base.to_path_buf()
    }
}

fn ensure_no_overwrite(paths: &[&Path], force: bool) -> Result<(), Error> {
    if force {
        return Ok(());
    }
    for p in paths {
        if p.exists() {
            return Err(Error::OutputAlreadyExists {
                path: p.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Appends `.srf` when the bare container name does not exist but the `.srf`
/// variant does
fn locate_srf(srf_file: &Path) -> Result<PathBuf, Error> {
    if srf_file.exists() {
        return Ok(srf_file.to_path_buf());
    }
    if srf_file.extension().is_none() {
        let candidate = with_suffix(srf_file, ".srf");
        if candidate.exists() {
            info!("note: adding '.srf' to the end of the container name");
            return Ok(candidate);
        }
    }
    Err(Error::MissingInputFile {
        path: srf_file.to_path_buf(),
    })
}

/// Converts a PNG image set (`<base>.png`, `<base>_info.txt`, and the mask
/// image when the sidecar names one) into an SRF container.
///
/// All companion files must exist and the output must not, unless `force` is
/// set. Validation happens before a single output byte is written.
#[instrument]
pub fn image_to_srf(base: &Path, srf_file: &Path, force: bool) -> Result<()> {
    let base = strip_png_ext(base);
    let png = with_suffix(&base, ".png");
    let info_file = with_suffix(&base, "_info.txt");
    for p in [&png, &info_file] {
        if !p.exists() {
            return Err(Error::MissingInputFile { path: p.clone() }.into());
        }
    }

    let srf_file = if srf_file.extension().is_none() {
        info!("note: adding '.srf' to the end of the output name");
        with_suffix(srf_file, ".srf")
    } else {
        srf_file.to_path_buf()
    };
    ensure_no_overwrite(&[&srf_file], force)?;

    let sidecar: Sidecar = fs::read_to_string(&info_file)?.parse()?;
    let dims = sidecar.sections()?;
    debug!("section layout from sidecar: {dims:?}");

    let srf = match &sidecar.mask_file {
        Some(mask_name) => {
            info!("converting images to SRF with separate alpha mask");
            let mask_path = PathBuf::from(mask_name);
            if !mask_path.exists() {
                return Err(Error::MissingInputFile { path: mask_path }.into());
            }
            let rgb = image::open(&png)?.to_rgb8();
            let mask = image::open(&mask_path)?.to_luma8();
            SrfImageFile::from_rgb_and_mask(&rgb, &mask, &dims)?
        }
        None => {
            info!("converting image to SRF");
            let canvas = image::open(&png)?.to_rgba8();
            SrfImageFile::from_canvas(canvas, &dims)?
        }
    };
    srf.into_file(&srf_file)?;
    info!("wrote {}", srf_file.display());
    Ok(())
}

/// Converts an SRF container into `<base>.png`, `<base>_info.txt`, and
/// (with `separate_mask`) `<base>_mask.png`.
///
/// `verify` enables the opt-in trailer checksum check before decoding; the
/// format itself never requires it on read.
#[instrument]
pub fn srf_to_image(
    srf_file: &Path,
    base: &Path,
    separate_mask: bool,
    force: bool,
    verify: bool,
) -> Result<()> {
    let srf_file = locate_srf(srf_file)?;
    let base = strip_png_ext(base);
    let png = with_suffix(&base, ".png");
    let mask_file = with_suffix(&base, "_mask.png");
    let info_file = with_suffix(&base, "_info.txt");

    let mut outputs: Vec<&Path> = vec![&png, &info_file];
    if separate_mask {
        outputs.push(&mask_file);
    }
    ensure_no_overwrite(&outputs, force)?;

    if verify {
        verify_reader(BufReader::new(fs::File::open(&srf_file)?))?;
        info!("trailer checksum verified");
    }

    let srf = SrfImageFile::from_file(&srf_file)?;
    if separate_mask {
        info!("converting SRF to PNG with separate alpha mask");
        let (rgb, mask) = srf.to_rgb_and_mask();
        rgb.save(&png)?;
        mask.save(&mask_file)?;
    } else {
        info!("converting SRF to PNG");
        srf.canvas().save(&png)?;
    }

    let sidecar = Sidecar::describe(
        separate_mask.then(|| mask_file.display().to_string()),
        srf.sections(),
    );
    fs::write(&info_file, sidecar.to_string())?;
    info!("wrote {} and {}", png.display(), info_file.display());
    Ok(())
}
