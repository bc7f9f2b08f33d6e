// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

// Catálogo de mensagens de erro por idioma.
// As chaves vêm de AppError::message_key().
const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("malformed_body", "The request body could not be read."),
    ("invalid_reference", "The referenced record does not exist in this office."),
    ("invalid_office_header", "The x-office-id header is missing or is not a valid id."),
    ("entity_not_found", "Record not found."),
    ("office_not_found", "Office not found."),
    ("user_not_found", "User not found."),
    ("invalid_token", "Invalid or missing authentication token."),
    ("invalid_otp", "The verification code is invalid."),
    ("otp_expired", "The verification code has expired."),
    ("too_many_attempts", "Too many verification attempts. Request a new code."),
    ("access_denied", "You do not have access to this office."),
    ("permission_denied", "You do not have permission to perform this action."),
    ("office_inactive", "This office is deactivated and cannot be changed."),
    ("owner_access_locked", "The office owner's access cannot be changed."),
    ("csrf_invalid", "CSRF token validation failed."),
    ("rate_limited", "Rate limit exceeded. Try again later."),
    ("internal_error", "An unexpected error occurred."),
];

const AR: &[(&str, &str)] = &[
    ("validation_failed", "حقل واحد أو أكثر غير صالح."),
    ("malformed_body", "تعذرت قراءة محتوى الطلب."),
    ("invalid_reference", "السجل المرتبط غير موجود في هذا المكتب."),
    ("invalid_office_header", "الترويسة x-office-id مفقودة أو غير صالحة."),
    ("entity_not_found", "السجل غير موجود."),
    ("office_not_found", "المكتب غير موجود."),
    ("user_not_found", "المستخدم غير موجود."),
    ("invalid_token", "رمز المصادقة غير صالح أو مفقود."),
    ("invalid_otp", "رمز التحقق غير صحيح."),
    ("otp_expired", "انتهت صلاحية رمز التحقق."),
    ("too_many_attempts", "محاولات تحقق كثيرة. اطلب رمزًا جديدًا."),
    ("access_denied", "ليس لديك صلاحية الوصول إلى هذا المكتب."),
    ("permission_denied", "ليس لديك صلاحية لتنفيذ هذا الإجراء."),
    ("office_inactive", "هذا المكتب معطل ولا يمكن تعديله."),
    ("owner_access_locked", "لا يمكن تعديل صلاحيات مالك المكتب."),
    ("csrf_invalid", "فشل التحقق من رمز CSRF."),
    ("rate_limited", "تم تجاوز حد الطلبات. حاول لاحقًا."),
    ("internal_error", "حدث خطأ غير متوقع."),
];

const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("malformed_body", "Não foi possível ler o corpo da requisição."),
    ("invalid_reference", "O registro referenciado não existe neste escritório."),
    ("invalid_office_header", "O cabeçalho x-office-id está ausente ou não é um id válido."),
    ("entity_not_found", "Registro não encontrado."),
    ("office_not_found", "Escritório não encontrado."),
    ("user_not_found", "Usuário não encontrado."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("invalid_otp", "O código de verificação é inválido."),
    ("otp_expired", "O código de verificação expirou."),
    ("too_many_attempts", "Tentativas demais. Solicite um novo código."),
    ("access_denied", "Você não tem acesso a este escritório."),
    ("permission_denied", "Você não tem permissão para realizar esta ação."),
    ("office_inactive", "Este escritório está desativado e não pode ser alterado."),
    ("owner_access_locked", "O acesso do dono do escritório não pode ser alterado."),
    ("csrf_invalid", "Falha na validação do token CSRF."),
    ("rate_limited", "Limite de requisições excedido. Tente novamente mais tarde."),
    ("internal_error", "Ocorreu um erro inesperado."),
];

pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        for (lang, entries) in [("en", EN), ("ar", AR), ("pt", PT)] {
            catalogs.insert(lang, entries.iter().copied().collect());
        }
        Self { catalogs }
    }

    /// Busca a mensagem no idioma pedido; cai para inglês e, por último, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG]
            .iter()
            .filter_map(|l| self.catalogs.get(*l))
            .find_map(|catalog| catalog.get(key))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
