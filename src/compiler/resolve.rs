//! Field type resolution against the reference scope.

use crate::config::ReferenceScope;
use crate::reflect::{Primitive, TypeUniverse};
use crate::viewmodel::FieldType;
use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{GenericArgument, PathArguments, Type};

pub(crate) struct TypeScope<'u> {
    universe: &'u TypeUniverse,
    scope: ReferenceScope,
}

impl<'u> TypeScope<'u> {
    pub(crate) fn new(universe: &'u TypeUniverse, scope: ReferenceScope) -> Self {
        TypeScope { universe, scope }
    }

    fn lookup(&self, name: &str) -> Option<FieldType> {
        if let Some(p) = Primitive::from_name(name) {
            return Some(FieldType::Primitive(p));
        }
        match self.scope {
            ReferenceScope::Primitives => None,
            ReferenceScope::AllLoaded => self.universe.find_enum(name).map(|e| FieldType::Enum {
                name: name.to_string(),
                variants: e.variants.clone(),
            }),
        }
    }
}

type Resolved = Result<(FieldType, bool), (Span, String)>;

/// Resolves `T` or `Option<T>`; the flag is nullability.
pub(crate) fn resolve_field_type(ty: &Type, scope: &TypeScope<'_>) -> Resolved {
    resolve(ty, scope, false)
}

fn resolve(ty: &Type, scope: &TypeScope<'_>, inside_option: bool) -> Resolved {
    let Type::Path(tp) = ty else {
        return Err((ty.span(), "view model fields must be named types".into()));
    };
    if tp.qself.is_some() {
        return Err((ty.span(), "qualified self types are not supported".into()));
    }
    let Some(last) = tp.path.segments.last() else {
        return Err((ty.span(), "empty type path".into()));
    };
    let name = last.ident.to_string();

    if name == "Option" {
        if inside_option {
            return Err((ty.span(), "nested `Option` is not supported".into()));
        }
        let inner = match &last.arguments {
            PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
                Some(GenericArgument::Type(inner)) => inner,
                _ => return Err((ty.span(), "`Option` expects one type argument".into())),
            },
            _ => return Err((ty.span(), "`Option` expects one type argument".into())),
        };
        let (field, _) = resolve(inner, scope, true)?;
        return Ok((field, true));
    }

    if !matches!(last.arguments, PathArguments::None) {
        return Err((ty.span(), format!("generic type `{}` is not supported in view models", name)));
    }
    scope
        .lookup(&name)
        .map(|field| (field, false))
        .ok_or_else(|| (ty.span(), format!("cannot find type `{}` in this scope", name)))
}
