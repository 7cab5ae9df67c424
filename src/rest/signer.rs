/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::Params;

/// Name of the parameter carrying the request signature
pub const SIGNATURE_PARAM: &str = "api_sig";

/// Computes the request signature.
///
/// The digest input is the shared secret followed by every `name` and `value`, in the
/// order they appear in `params`, with no separators. Callers sort the parameters first.
pub fn sign(secret: &str, params: &Params) -> String {
    let capacity = secret.len() + params.iter().map(|(n, v)| n.len() + v.len()).sum::<usize>();
    let mut input = String::with_capacity(capacity);
    input.push_str(secret);
    for (name, value) in params.iter() {
        input.push_str(name);
        input.push_str(value);
    }
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Sorts the parameters and appends their signature as the final parameter
pub fn sign_params(secret: &str, params: &mut Params) {
    params.remove(SIGNATURE_PARAM);
    params.sort_by_name();
    let signature = sign(secret, params);
    log::debug!("Signature: '{}'", signature);
    params.insert(SIGNATURE_PARAM, &signature);
}
