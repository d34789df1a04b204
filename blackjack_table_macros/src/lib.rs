use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Ident, ImplItemFn};

/// This macro is added before a method of the `Dealer` struct in the impl block.
/// Use this macro to first check if the current round phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(Deal)]` will make a method first check if the
/// current round phase is `RoundPhase::Deal`. If not, the method returns
/// `TableError::PhaseViolation` without touching the table.
///
/// The annotated method must return `Result<_, TableError>`, and both `RoundPhase`
/// and `TableError` must be in scope where the method is defined.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let phase = parse_macro_input!(attr as Ident);
    let mut method = parse_macro_input!(item as ImplItemFn);
    let action = method.sig.ident.to_string();

    let guard: TokenStream2 = quote! {
        if self.phase != RoundPhase::#phase {
            return Err(TableError::PhaseViolation {
                action: #action,
                expected: RoundPhase::#phase,
                actual: self.phase,
            });
        }
    };
    let guard: syn::Stmt = match syn::parse2(guard) {
        Ok(stmt) => stmt,
        Err(err) => return err.to_compile_error().into(),
    };
    method.block.stmts.insert(0, guard);

    quote!(#method).into()
}
