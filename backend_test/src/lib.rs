use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous route test into a synchronous one running against a
/// fresh in-memory store, injecting dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// `crate::model::store::Store`. Pass `admin` or `student` to log the client in
/// first; `student` also seeds the example classes, dorms, posts and student.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the injected arguments and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as admin/student if needed. Responses are scoped so the
    // client can be moved into the test afterwards.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "admin" => quote! {
            {
                let response = rocket_client
                    .post(uri!(crate::api::auth::authenticate))
                    .header(rocket::http::ContentType::JSON)
                    .body(
                        rocket::serde::json::json!(crate::model::admin::AdminCredentials::example())
                            .to_string(),
                    )
                    .dispatch()
                    .await;
                assert_eq!(rocket::http::Status::Ok, response.status(), "admin login failed");
            }
        },
        Some(arg) if arg == "student" => quote! {
            store
                .write(|dir| {
                    let example = crate::model::directory::Directory::example();
                    dir.collections = example.collections;
                    dir.students.push(crate::model::student::Student::example());
                    Ok::<_, crate::error::Error>(())
                })
                .await
                .unwrap();

            {
                let response = rocket_client
                    .post(uri!(crate::api::auth::login))
                    .header(rocket::http::ContentType::JSON)
                    .body(
                        rocket::serde::json::json!(
                            crate::model::student::StudentCredentials::example()
                        )
                        .to_string(),
                    )
                    .dispatch()
                    .await;
                assert_eq!(rocket::http::Status::Ok, response.status(), "student login failed");
            }
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `admin` or `student`")
                .into_compile_error()
                .into();
        }
        None => TokenStream2::new(),
    };

    // Rewrite the test function.
    quote! {
        #[rocket::async_test]
        async fn #name() {
            /// The test itself.
            #item_fn

            // Test setup.
            let store = crate::model::store::Store::in_memory("2024").await.unwrap();
            let rocket_client = rocket::local::asynchronous::Client::tracked(
                crate::rocket_for_store(store.clone()).await,
            )
            .await
            .unwrap();

            #maybe_login

            #new_name(#(#test_args),*).await;
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_store = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself.
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "Store" {
                    if has_store {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `Store`",
                        ));
                    }
                    has_store = true;
                    args.push(quote! { store });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `store_ident: Store`",
        ));
    }

    Ok(args)
}
