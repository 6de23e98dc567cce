use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{HtmlImageElement, WebGl2RenderingContext as GL, WebGlTexture};

use crate::error::{DemoError, Result};

const PLACEHOLDER: [u8; 4] = [255, 255, 255, 255];

/// Creates a texture holding a single white pixel and starts loading `path`
/// into it. The real image replaces the placeholder once it arrives; a
/// failed load only logs.
pub fn load(gl: &GL, path: &str) -> Result<WebGlTexture> {
    let texture = gl
        .create_texture()
        .ok_or(DemoError::GlResource("texture"))?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        1,
        1,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(&PLACEHOLDER),
    )?;
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);

    let image = HtmlImageElement::new()?;

    let onload = {
        let gl = gl.clone();
        let texture = texture.clone();
        let image = image.clone();
        let path = path.to_string();
        Closure::once(move || {
            if let Err(err) = upload(&gl, &texture, &image) {
                log::error!("texture upload failed for {path}: {err}");
                return;
            }
            log::info!(
                "texture loaded: {path} ({}x{})",
                image.natural_width(),
                image.natural_height()
            );
        })
    };
    let onerror = {
        let path = path.to_string();
        Closure::once(move || log::error!("failed to load texture {path}"))
    };

    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();
    image.set_src(path);

    Ok(texture)
}

fn upload(gl: &GL, texture: &WebGlTexture, image: &HtmlImageElement) -> Result<()> {
    gl.bind_texture(GL::TEXTURE_2D, Some(texture));
    gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 1);
    let uploaded = gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        image,
    );
    gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 0);
    uploaded?;

    gl.generate_mipmap(GL::TEXTURE_2D);
    gl.tex_parameteri(
        GL::TEXTURE_2D,
        GL::TEXTURE_MIN_FILTER,
        GL::LINEAR_MIPMAP_LINEAR as i32,
    );
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
    Ok(())
}
