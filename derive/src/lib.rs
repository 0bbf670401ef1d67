use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_sentence;

#[proc_macro_derive(FromSentence, attributes(sentence, field))]
pub fn derive_from_sentence(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_sentence::expand_from_sentence(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
