use syn::{Field, FieldsNamed, Token, Type, punctuated::Punctuated};

fn is_named(field: &Field, name: &str) -> bool {
    field.ident.as_ref().map(|i| i == name).unwrap_or(false)
}

/// 确保具名字段结构体包含所需字段，并将其按给定顺序置于最前
/// - 已存在的字段复用原定义（保留属性与可见性）
/// - 缺失的字段以 `name: Type` 形式补齐
/// - 其余字段保持原有相对顺序
pub(crate) fn ensure_leading_fields(fields_named: &mut FieldsNamed, required: &[(&str, &Type)]) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    for (name, ty) in required.iter() {
        match old_named.iter().find(|f| is_named(f, name)) {
            Some(existing) => new_named.push(existing.clone()),
            None => {
                let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
                let field: Field = syn::parse_quote! { #ident: #ty };
                new_named.push(field);
            }
        }
    }

    for f in old_named.into_iter() {
        if !required.iter().any(|(name, _)| is_named(&f, name)) {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}
