//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use feedback_core::{ApiError, HttpMethod, Rating, Review, ReviewId, Summary};

/// Opaque handle to a `FeedbackClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiFeedbackClient {
    pub(crate) inner: feedback_core::FeedbackClient,
}

/// Owned C string, or null when `s` contains an interior NUL.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).map(CString::into_raw).unwrap_or(std::ptr::null_mut())
}

fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map(c_string).unwrap_or(std::ptr::null_mut())
}

/// Borrow a C string as UTF-8. Null and invalid UTF-8 are `None`.
pub(crate) fn str_from<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `feedback_build_*` functions. The C caller executes the request
/// and passes the response back through `feedback_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: feedback_core::HttpRequest) -> *mut Self {
        let path = c_string(req.path);
        let body = c_string_opt(req.body);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `feedback_parse_*` function. The FFI layer
/// reads but does not free these fields. Every pointer may be null.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub status_text: *const c_char,
    pub content_type: *const c_char,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> feedback_core::HttpResponse {
        let headers = str_from(self.content_type)
            .map(|ct| vec![("content-type".to_string(), ct.to_string())])
            .unwrap_or_default();
        feedback_core::HttpResponse {
            status: self.status,
            status_text: str_from(self.status_text).unwrap_or_default().to_string(),
            headers,
            body: str_from(self.body).unwrap_or_default().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiFeedbackResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    AuthRequired = 1,
    Http = 2,
    Submission = 3,
    List = 4,
    UnexpectedShape = 5,
    UnexpectedResponse = 6,
    Validation = 7,
    Serialization = 8,
    Deserialization = 9,
    Transport = 10,
    Panic = 11,
    NullArg = 12,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::AuthRequired => FfiErrorCode::AuthRequired,
            ApiError::Api { .. } => FfiErrorCode::Http,
            ApiError::Submission(_) => FfiErrorCode::Submission,
            ApiError::List(_) => FfiErrorCode::List,
            ApiError::UnexpectedShape(_) => FfiErrorCode::UnexpectedShape,
            ApiError::UnexpectedResponse => FfiErrorCode::UnexpectedResponse,
            ApiError::Validation(_) => FfiErrorCode::Validation,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        }
    }
}

/// Tag that tells `feedback_free_result` what `FfiFeedbackResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Review = 1,
    ReviewList = 2,
}

/// A single review exposed to C.
///
/// `rating_value` is the integer rating, or -1 when the transport form is
/// not numeric. `submitted_at` and `response` are null when absent.
#[repr(C)]
pub struct FfiReview {
    pub id: *mut c_char,
    pub content: *mut c_char,
    pub rating: *mut c_char,
    pub rating_value: i32,
    pub submitted_at: *mut c_char,
    pub response: *mut c_char,
}

impl FfiReview {
    fn from_core(review: Review) -> Self {
        let rating_value = review
            .rating
            .value()
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(-1);
        FfiReview {
            id: c_string(review.id.to_string()),
            content: c_string(review.content),
            rating: c_string(review.rating.to_string()),
            rating_value,
            submitted_at: c_string_opt(review.submitted_at),
            response: c_string_opt(review.response),
        }
    }

    /// Rebuild a core review from the C fields. Returns `None` when the id
    /// is missing.
    pub(crate) fn to_core(&self) -> Option<Review> {
        let id = str_from(self.id).filter(|id| !id.is_empty())?;
        Some(Review {
            id: ReviewId::new(id),
            content: str_from(self.content).unwrap_or_default().to_string(),
            rating: Rating::from(str_from(self.rating).unwrap_or_default()),
            submitted_at: str_from(self.submitted_at).map(str::to_string),
            response: str_from(self.response).map(str::to_string),
        })
    }

    pub(crate) fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.content);
        free_c_string(self.rating);
        free_c_string(self.submitted_at);
        free_c_string(self.response);
    }
}

/// A list of reviews exposed to C.
#[repr(C)]
pub struct FfiReviewList {
    pub items: *mut FfiReview,
    pub len: u32,
}

impl FfiReviewList {
    pub(crate) fn as_slice(&self) -> &[FfiReview] {
        if self.items.is_null() || self.len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.items, self.len as usize) }
        }
    }

    /// Core reviews for every item that still carries an id.
    pub(crate) fn to_core(&self) -> Vec<Review> {
        self.as_slice().iter().filter_map(FfiReview::to_core).collect()
    }
}

/// Summary statistics returned by value from `feedback_summarize`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FfiSummary {
    pub count: u32,
    pub average_rating: f64,
    pub satisfaction_rate: u32,
}

impl From<Summary> for FfiSummary {
    fn from(summary: Summary) -> Self {
        FfiSummary {
            count: u32::try_from(summary.count).unwrap_or(u32::MAX),
            average_rating: summary.average_rating,
            satisfaction_rate: summary.satisfaction_rate,
        }
    }
}

/// Result envelope for parse and filter operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null. `http_status` is set only
/// for `Http` errors.
#[repr(C)]
pub struct FfiFeedbackResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiFeedbackResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiFeedbackResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying a single `FfiReview`.
    pub(crate) fn ok_review(review: Review) -> *mut Self {
        let ffi_review = Box::new(FfiReview::from_core(review));
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::Review,
            Box::into_raw(ffi_review) as *mut std::ffi::c_void,
        )
    }

    /// Build a success result carrying a `FfiReviewList`.
    pub(crate) fn ok_review_list(reviews: Vec<Review>) -> *mut Self {
        let len = reviews.len() as u32;
        let items = if reviews.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_reviews: Box<[FfiReview]> = reviews.into_iter().map(FfiReview::from_core).collect();
            Box::into_raw(ffi_reviews) as *mut FfiReview
        };

        let ffi_list = Box::new(FfiReviewList { items, len });
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::ReviewList,
            Box::into_raw(ffi_list) as *mut std::ffi::c_void,
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let http_status = err.status().unwrap_or(0);
        Self::boxed(
            FfiErrorCode::from(&err),
            c_string(err.message()),
            http_status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}
