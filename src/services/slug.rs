use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repositories;

const MAX_SUFFIX_ATTEMPTS: usize = 5;
const FALLBACK_SLUG: &str = "test";

#[derive(Debug, Error)]
pub(crate) enum SlugError {
    #[error("cannot generate unique slug for {0}")]
    Exhausted(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Lowercase ASCII slug: diacritics are folded, whitespace and underscores become dashes and
/// anything else outside `[a-z0-9-]` is dropped. Repeated dashes collapse into one.
pub(crate) fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());

    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if let Some(folded) = fold_diacritic(ch) {
            slug.push_str(folded);
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_string()
}

/// Slug for `name` that no test uses yet, soft-deleted ones included.
pub(crate) async fn unique_test_slug(pool: &PgPool, name: &str) -> Result<String, SlugError> {
    let base = slugify(name);
    if !repositories::ielts_tests::slug_taken(pool, &base).await? {
        return Ok(base);
    }

    for _ in 0..MAX_SUFFIX_ATTEMPTS {
        let candidate = format!("{base}-{}", random_suffix());
        if !repositories::ielts_tests::slug_taken(pool, &candidate).await? {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted(base))
}

fn fold_diacritic(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ạ' | 'ả' | 'ấ' | 'ầ' | 'ẩ' | 'ẫ'
        | 'ậ' | 'ắ' | 'ằ' | 'ẳ' | 'ẵ' | 'ặ' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' | 'ẹ' | 'ẻ' | 'ẽ' | 'ế' | 'ề' | 'ể'
        | 'ễ' | 'ệ' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' | 'ỉ' | 'ị' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'ơ' | 'ọ' | 'ỏ' | 'ố' | 'ồ' | 'ổ'
        | 'ỗ' | 'ộ' | 'ớ' | 'ờ' | 'ở' | 'ỡ' | 'ợ' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'ư' | 'ụ' | 'ủ' | 'ứ' | 'ừ'
        | 'ử' | 'ữ' | 'ự' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' | 'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}
