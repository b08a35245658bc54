use image::RgbaImage;
use pdf_writer::{Filter, Pdf, Ref};

use crate::error::Error;

/// Write `img` as a Flate-compressed RGB image XObject, with a soft mask when
/// any pixel is translucent.
pub(super) fn embed_rgba(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    img: &RgbaImage,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    let (w, h) = (img.width(), img.height());
    let w = i32::try_from(w).map_err(|_| Error::Encoding(format!("image width {w} too large")))?;
    let h = i32::try_from(h).map_err(|_| Error::Encoding(format!("image height {h} too large")))?;
    if w == 0 || h == 0 {
        return Err(Error::Encoding("cannot embed an empty image".into()));
    }
    let has_alpha = img.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = img
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = img.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w);
        mask.height(h);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w);
    xobj.height(h);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Ok(())
}
