//! FFI 模块：向 C 及其他语言暴露渲染接口
//!
//! 返回的字符串由本库分配，调用方用完后必须交给 `mathtext_free` 释放。

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error::RenderError;
use crate::render_svg;

/// 渲染失败时返回的兜底 SVG
fn error_svg(message: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="0" y="14" font-size="14" fill="red">{message}</text></svg>"#
    )
}

/// 把 Rust 字符串交给调用方；内部含 \0 时退化为空串
fn string_to_c_pointer(text: &str) -> *mut c_char {
    CString::new(text).unwrap_or_default().into_raw()
}

fn error_to_svg(err: &RenderError) -> String {
    let message = match err {
        RenderError::EmptyInput => "Empty Formula",
        RenderError::InvalidUtf8 => "Invalid UTF-8",
        RenderError::LimitExceeded(_) => "Formula Too Large",
        _ => "Invalid Formula",
    };
    error_svg(message)
}

/// 把 `tex` 渲染成 SVG，失败时返回错误提示 SVG，永远不会返回空指针
///
/// # Safety
///
/// `tex` 必须为空指针或指向以 \0 结尾的字符串。
#[no_mangle]
pub unsafe extern "C" fn mathtext_render_svg(tex: *const c_char) -> *mut c_char {
    if tex.is_null() {
        return string_to_c_pointer(&error_to_svg(&RenderError::EmptyInput));
    }
    let input = CStr::from_ptr(tex);
    let svg = match input.to_str() {
        Ok(formula) => render_svg(formula).unwrap_or_else(|err| {
            log::debug!("渲染失败: {err}");
            error_to_svg(&err)
        }),
        Err(_) => error_to_svg(&RenderError::InvalidUtf8),
    };
    string_to_c_pointer(&svg)
}

/// 释放 `mathtext_render_svg` 返回的字符串
///
/// # Safety
///
/// `ptr` 必须为空指针或 `mathtext_render_svg` 的返回值，且只能释放一次。
#[no_mangle]
pub unsafe extern "C" fn mathtext_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(CString::from_raw(ptr));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_yields_error_svg() {
        unsafe {
            let ptr = mathtext_render_svg(std::ptr::null());
            let text = CStr::from_ptr(ptr).to_str().unwrap().to_owned();
            mathtext_free(ptr);
            assert!(text.contains("Empty Formula"));

            let bad = [0xffu8, 0xfe, 0x00];
            let ptr = mathtext_render_svg(bad.as_ptr() as *const c_char);
            let text = CStr::from_ptr(ptr).to_str().unwrap().to_owned();
            mathtext_free(ptr);
            assert!(text.contains("Invalid UTF-8"));
        }
    }

    #[test]
    fn deeply_nested_input_is_refused() {
        let mut deep = "{".repeat(2_000);
        deep.push('x');
        deep.push_str(&"}".repeat(2_000));
        let input = CString::new(deep).unwrap();
        unsafe {
            let ptr = mathtext_render_svg(input.as_ptr());
            let text = CStr::from_ptr(ptr).to_str().unwrap().to_owned();
            mathtext_free(ptr);
            assert!(text.contains("Formula Too Large"));
        }
    }

    #[test]
    fn freeing_null_is_a_no_op() {
        unsafe { mathtext_free(std::ptr::null_mut()) };
    }
}
