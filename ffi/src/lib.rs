//! C-ABI wrapper around `feedback-core`.
//!
//! # Overview
//! Exposes the feedback API through `extern "C"` functions so any language
//! with a C FFI can build and parse HTTP requests/responses, and run the
//! filter and summary views, without linking to serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiFeedbackResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `feedback_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use feedback_core::{filter_by_rating, summarize, ClientConfig, FeedbackClient, NewReview, RatingFilter, StaticToken};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `FeedbackClient` for `{base_url}/{api_version}`.
///
/// `token` may be null for an anonymous client; such a client can list but
/// not submit. Returns null if `base_url` or `api_version` is null or not
/// valid UTF-8, if the configuration is invalid, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `feedback_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_client_new(
    base_url: *const c_char,
    api_version: *const c_char,
    token: *const c_char,
) -> *mut FfiFeedbackClient {
    catch_unwind(|| {
        let (Some(url), Some(version)) = (str_from(base_url), str_from(api_version)) else {
            return std::ptr::null_mut();
        };
        let config = ClientConfig::new(url, version);
        if config.validate().is_err() {
            return std::ptr::null_mut();
        }
        let token = StaticToken::from(str_from(token).map(str::to_string));
        let client = FeedbackClient::new(config, token);
        Box::into_raw(Box::new(FfiFeedbackClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `FeedbackClient` created by `feedback_client_new`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_client_free(client: *mut FfiFeedbackClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the authenticated POST for a new review.
///
/// `rating` is the decimal form of an integer in 1..=5. Returns null if any
/// argument is null, if the input fails validation, or if the client has no
/// token. No request should be sent in any of those cases.
/// The caller must free the returned pointer with `feedback_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_build_submit(
    client: *const FfiFeedbackClient,
    content: *const c_char,
    rating: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let (Some(content), Some(rating)) = (str_from(content), str_from(rating)) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let built = NewReview::new(content, rating).and_then(|input| client.inner.build_submit(&input));
        match built {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build the GET for the review list. The bearer token is attached only when
/// the client has one.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_build_list_all(client: *const FfiFeedbackClient) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_all())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse the response to a submit request.
///
/// Returns a result with `data_tag = Review` on success.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_parse_submit(
    client: *const FfiFeedbackClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFeedbackResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiFeedbackResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFeedbackResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_submit(resp.to_core()) {
            Ok(review) => FfiFeedbackResult::ok_review(review),
            Err(e) => FfiFeedbackResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiFeedbackResult::panic("panic in feedback_parse_submit"))
}

/// Parse the response to a list request.
///
/// Returns a result with `data_tag = ReviewList` on success. A successful
/// envelope without an array payload yields an empty list.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_parse_list_all(
    client: *const FfiFeedbackClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFeedbackResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiFeedbackResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFeedbackResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_list_all(resp.to_core()) {
            Ok(reviews) => FfiFeedbackResult::ok_review_list(reviews),
            Err(e) => FfiFeedbackResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiFeedbackResult::panic("panic in feedback_parse_list_all"))
}

// ---------------------------------------------------------------------------
// View functions
// ---------------------------------------------------------------------------

/// Copy the reviews in `list` whose rating matches `rating` (`"all"` or an
/// integer) into a new result with `data_tag = ReviewList`.
///
/// An unparseable filter yields a `Validation` error. `list` is not modified.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_filter_by_rating(
    list: *const FfiReviewList,
    rating: *const c_char,
) -> *mut FfiFeedbackResult {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return FfiFeedbackResult::null_arg("list");
        }
        let Some(rating) = str_from(rating) else {
            return FfiFeedbackResult::null_arg("rating");
        };
        let filter: RatingFilter = match rating.parse() {
            Ok(filter) => filter,
            Err(e) => return FfiFeedbackResult::from_error(e),
        };
        let reviews = unsafe { &*list }.to_core();
        let kept = filter_by_rating(&reviews, &filter).into_iter().cloned().collect();
        FfiFeedbackResult::ok_review_list(kept)
    }))
    .unwrap_or_else(|_| FfiFeedbackResult::panic("panic in feedback_filter_by_rating"))
}

/// Count, average rating and satisfaction percentage for `list`.
///
/// A null or empty list summarizes to all zeros.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_summarize(list: *const FfiReviewList) -> FfiSummary {
    let zero = FfiSummary {
        count: 0,
        average_rating: 0.0,
        satisfaction_rate: 0,
    };
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return zero;
        }
        let reviews = unsafe { &*list }.to_core();
        FfiSummary::from(summarize(&reviews))
    }))
    .unwrap_or(zero)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `feedback_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }));
}

/// Free an `FfiFeedbackResult` returned by any `feedback_parse_*` or
/// `feedback_filter_by_rating` call. Safe to call with null. Uses
/// `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_free_result(result: *mut FfiFeedbackResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Review => {
                let review = unsafe { Box::from_raw(result.data as *mut FfiReview) };
                review.free_fields();
            }
            FfiDataTag::ReviewList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiReviewList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
                    };
                    for item in items.iter() {
                        item.free_fields();
                    }
                }
            }
            FfiDataTag::None => {}
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn feedback_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::ffi::{CStr, CString};

    const BASE: &str = "http://localhost:3000";

    fn new_client(token: Option<&str>) -> *mut FfiFeedbackClient {
        let url = CString::new(BASE).unwrap();
        let version = CString::new("v1").unwrap();
        let token = token.map(|t| CString::new(t).unwrap());
        feedback_client_new(
            url.as_ptr(),
            version.as_ptr(),
            token.as_ref().map_or(std::ptr::null(), |t| t.as_ptr()),
        )
    }

    fn read(ptr: *const c_char) -> &'static str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn headers(req: &FfiHttpRequest) -> Vec<(String, String)> {
        if req.headers.is_null() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) }
            .iter()
            .map(|h| (read(h.key).to_string(), read(h.value).to_string()))
            .collect()
    }

    /// Parse `body` as a JSON response through `parse`.
    fn parse_json(
        client: *const FfiFeedbackClient,
        status: u16,
        body: &str,
        parse: extern "C" fn(*const FfiFeedbackClient, *const FfiHttpResponse) -> *mut FfiFeedbackResult,
    ) -> *mut FfiFeedbackResult {
        let content_type = CString::new("application/json").unwrap();
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status,
            status_text: std::ptr::null(),
            content_type: content_type.as_ptr(),
            body: body.as_ptr(),
        };
        parse(client, &resp)
    }

    fn list_of(client: *const FfiFeedbackClient, body: &str) -> *mut FfiFeedbackResult {
        let result = parse_json(client, 200, body, feedback_parse_list_all);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::ReviewList);
        result
    }

    const FOUR_REVIEWS: &str = r#"{"success":true,"data":[
        {"id":"a","content":"Perfect denim","rating":"5"},
        {"id":"b","content":"Okay","rating":3},
        {"id":"c","content":"Good value","rating":"4","response":"Thanks!"},
        {"id":"d","content":"Torn seam","rating":"2"}
    ]}"#;

    #[test]
    fn client_new_and_free() {
        let client = new_client(Some("tok"));
        assert!(!client.is_null());
        feedback_client_free(client);
    }

    #[test]
    fn client_new_null_args_return_null() {
        let version = CString::new("v1").unwrap();
        assert!(feedback_client_new(std::ptr::null(), version.as_ptr(), std::ptr::null()).is_null());
        let url = CString::new(BASE).unwrap();
        assert!(feedback_client_new(url.as_ptr(), std::ptr::null(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_new_rejects_empty_version() {
        let url = CString::new(BASE).unwrap();
        let version = CString::new("/").unwrap();
        assert!(feedback_client_new(url.as_ptr(), version.as_ptr(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        feedback_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_submit_produces_authenticated_post() {
        let client = new_client(Some("tok"));
        let content = CString::new("  Lovely scarf ").unwrap();
        let rating = CString::new("5").unwrap();
        let req = feedback_build_submit(client, content.as_ptr(), rating.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        assert_eq!(read(req_ref.path), "http://localhost:3000/v1/feedback/feedback");
        assert_eq!(req_ref.headers_len, 3);
        assert!(headers(req_ref).contains(&("authorization".to_string(), "Bearer tok".to_string())));

        let body: serde_json::Value = serde_json::from_str(read(req_ref.body)).unwrap();
        assert_eq!(body, serde_json::json!({"content": "Lovely scarf", "rating": "5"}));

        feedback_free_request(req);
        feedback_client_free(client);
    }

    #[test]
    fn build_submit_without_token_returns_null() {
        let client = new_client(None);
        let content = CString::new("Lovely scarf").unwrap();
        let rating = CString::new("5").unwrap();
        assert!(feedback_build_submit(client, content.as_ptr(), rating.as_ptr()).is_null());
        feedback_client_free(client);
    }

    #[test]
    fn build_submit_invalid_input_returns_null() {
        let client = new_client(Some("tok"));
        let blank = CString::new("   ").unwrap();
        let ok = CString::new("fine").unwrap();
        let five = CString::new("5").unwrap();
        let nine = CString::new("9").unwrap();
        assert!(feedback_build_submit(client, blank.as_ptr(), five.as_ptr()).is_null());
        assert!(feedback_build_submit(client, ok.as_ptr(), nine.as_ptr()).is_null());
        assert!(feedback_build_submit(client, ok.as_ptr(), std::ptr::null()).is_null());
        assert!(feedback_build_submit(std::ptr::null(), ok.as_ptr(), five.as_ptr()).is_null());
        feedback_client_free(client);
    }

    #[test]
    fn build_list_all_attaches_token_only_when_present() {
        let client = new_client(None);
        let req = feedback_build_list_all(client);
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(read(req_ref.path), "http://localhost:3000/v1/feedback/list_feedback");
        assert_eq!(headers(req_ref), vec![("accept".to_string(), "*/*".to_string())]);
        assert!(req_ref.body.is_null());
        feedback_free_request(req);
        feedback_client_free(client);

        let client = new_client(Some("tok"));
        let req = feedback_build_list_all(client);
        assert_eq!(unsafe { &*req }.headers_len, 2);
        feedback_free_request(req);
        feedback_client_free(client);
    }

    #[test]
    fn build_list_all_null_client_returns_null() {
        assert!(feedback_build_list_all(std::ptr::null()).is_null());
    }

    #[test]
    fn parse_submit_success() {
        let client = new_client(Some("tok"));
        let result = parse_json(
            client,
            201,
            r#"{"success":true,"data":{"id":"r-1","content":"Lovely scarf","rating":"5","submitted_at":"2024-05-01T10:00:00Z"}}"#,
            feedback_parse_submit,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.data_tag, FfiDataTag::Review);

        let review = unsafe { &*(r.data as *const FfiReview) };
        assert_eq!(read(review.id), "r-1");
        assert_eq!(read(review.content), "Lovely scarf");
        assert_eq!(read(review.rating), "5");
        assert_eq!(review.rating_value, 5);
        assert_eq!(read(review.submitted_at), "2024-05-01T10:00:00Z");
        assert!(review.response.is_null());

        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_submit_failure_envelope() {
        let client = new_client(Some("tok"));
        let result = parse_json(
            client,
            200,
            r#"{"success":false,"message":"Already reviewed"}"#,
            feedback_parse_submit,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Submission);
        assert_eq!(read(r.error_message), "Already reviewed");
        assert!(r.data.is_null());
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_http_error_carries_status_and_message() {
        let client = new_client(Some("tok"));
        let result = parse_json(client, 401, r#"{"message":"Token expired"}"#, feedback_parse_submit);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 401);
        assert_eq!(read(r.error_message), "Token expired");
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_plain_text_error_uses_status_text() {
        let client = new_client(None);
        let status_text = CString::new("Service Unavailable").unwrap();
        let resp = FfiHttpResponse {
            status: 503,
            status_text: status_text.as_ptr(),
            content_type: std::ptr::null(),
            body: std::ptr::null(),
        };
        let result = feedback_parse_list_all(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(read(r.error_message), "503 Service Unavailable");
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_list_all_items() {
        let client = new_client(None);
        let result = list_of(client, FOUR_REVIEWS);
        let list = unsafe { &*((*result).data as *const FfiReviewList) };
        assert_eq!(list.len, 4);
        let items = list.as_slice();
        assert_eq!(read(items[1].rating), "3");
        assert_eq!(items[1].rating_value, 3);
        assert_eq!(read(items[2].response), "Thanks!");
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_list_all_non_array_is_empty() {
        let client = new_client(None);
        let result = list_of(client, r#"{"success":true,"data":"not-an-array"}"#);
        let list = unsafe { &*((*result).data as *const FfiReviewList) };
        assert_eq!(list.len, 0);
        assert!(list.items.is_null());
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_list_all_failure_envelope() {
        let client = new_client(None);
        let result = parse_json(
            client,
            200,
            r#"{"success":false,"message":"Service unavailable"}"#,
            feedback_parse_list_all,
        );
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::List);
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let result = parse_json(std::ptr::null(), 200, "[]", feedback_parse_list_all);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(read(r.error_message), "null argument: client");
        feedback_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client(None);
        let result = feedback_parse_list_all(client, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn filter_by_rating_copies_matching_reviews() {
        let client = new_client(None);
        let result = list_of(client, FOUR_REVIEWS);
        let list = unsafe { (*result).data as *const FfiReviewList };

        let four = CString::new("4").unwrap();
        let filtered = feedback_filter_by_rating(list, four.as_ptr());
        let f = unsafe { &*filtered };
        assert_eq!(f.error_code, FfiErrorCode::Ok);
        let kept = unsafe { &*(f.data as *const FfiReviewList) };
        assert_eq!(kept.len, 1);
        assert_eq!(read(kept.as_slice()[0].id), "c");
        feedback_free_result(filtered);

        let all = CString::new("all").unwrap();
        let filtered = feedback_filter_by_rating(list, all.as_ptr());
        let kept = unsafe { &*((*filtered).data as *const FfiReviewList) };
        let ids: Vec<&str> = kept.as_slice().iter().map(|r| read(r.id)).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        feedback_free_result(filtered);

        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn filter_by_rating_rejects_bad_filter() {
        let empty = FfiReviewList {
            items: std::ptr::null_mut(),
            len: 0,
        };
        let bad = CString::new("five").unwrap();
        let result = feedback_filter_by_rating(&empty, bad.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Validation);
        feedback_free_result(result);

        let result = feedback_filter_by_rating(std::ptr::null(), bad.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        feedback_free_result(result);
    }

    #[test]
    fn summarize_list() {
        let client = new_client(None);
        let result = list_of(client, FOUR_REVIEWS);
        let list = unsafe { (*result).data as *const FfiReviewList };
        assert_eq!(
            feedback_summarize(list),
            FfiSummary {
                count: 4,
                average_rating: 3.5,
                satisfaction_rate: 50,
            }
        );
        feedback_free_result(result);
        feedback_client_free(client);
    }

    #[test]
    fn summarize_null_or_empty_is_zero() {
        let zero = FfiSummary {
            count: 0,
            average_rating: 0.0,
            satisfaction_rate: 0,
        };
        assert_eq!(feedback_summarize(std::ptr::null()), zero);
        let empty = FfiReviewList {
            items: std::ptr::null_mut(),
            len: 0,
        };
        assert_eq!(feedback_summarize(&empty), zero);
    }

    #[test]
    fn free_request_null_is_safe() {
        feedback_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        feedback_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        feedback_free_string(std::ptr::null_mut());
    }
}
