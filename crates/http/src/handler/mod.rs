//! The request handler extension point.
//!
//! A handler receives a fresh, empty [`Response`] once per completed request
//! and fills in its body. It runs synchronously on the reactor thread, so it
//! must not block: every other connection waits while it runs.

use crate::protocol::Response;

pub trait Handler {
    fn call(&self, response: &mut Response);
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Response),
{
    fn call(&self, response: &mut Response) {
        (self.f)(response);
    }
}

/// Wraps a plain function or closure into a [`Handler`].
///
/// ```
/// use nano_http::handler::{make_handler, Handler};
/// use nano_http::protocol::Response;
///
/// let handler = make_handler(|response: &mut Response| response.set_body("hello world\n"));
/// let mut response = Response::new();
/// handler.call(&mut response);
/// assert_eq!(response.body(), b"hello world\n");
/// ```
pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Response),
{
    HandlerFn { f }
}

impl<H: Handler + ?Sized> Handler for std::rc::Rc<H> {
    fn call(&self, response: &mut Response) {
        (**self).call(response);
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn call(&self, response: &mut Response) {
        (**self).call(response);
    }
}
