// ==========================================
// 元器件库存系统 - 捷克语排序规则
// ==========================================
// 用途: 料站号展示排序（与产线终端的捷克语区域设置一致）
// 规则: 三级比较
//   一级: 空白 < 标点符号 < 数字 < 字母；字母按捷克字母表，
//         č/ř/š/ž 为独立字母，ch 为 h 之后的独立字母
//   二级: 其余重音（á é ě í ó ú ů ý ď ň ť）只在一级相同时区分
//   三级: 小写在大写之前
// 局限: 非字母字符在各自类别内按码位排序（ICU 按标点权重表）；
//       未列入重音表的外文字母排在 ž 之后，按码位
// ==========================================

use std::cmp::Ordering;

/// 捷克字母表（一级顺序）
const ALPHABET: &[&str] = &[
    "a", "b", "c", "č", "d", "e", "f", "g", "h", "ch", "i", "j", "k", "l", "m", "n", "o", "p",
    "q", "r", "ř", "s", "š", "t", "u", "v", "w", "x", "y", "z", "ž",
];

/// 二级重音: (重音字母, 基础字母, 二级权重)
const SECONDARY_ACCENTS: &[(char, char, u8)] = &[
    ('á', 'a', 1),
    ('ä', 'a', 2),
    ('ď', 'd', 1),
    ('é', 'e', 1),
    ('ě', 'e', 2),
    ('í', 'i', 1),
    ('ň', 'n', 1),
    ('ĺ', 'l', 1),
    ('ľ', 'l', 2),
    ('ó', 'o', 1),
    ('ô', 'o', 2),
    ('ö', 'o', 3),
    ('ŕ', 'r', 1),
    ('ť', 't', 1),
    ('ú', 'u', 1),
    ('ů', 'u', 2),
    ('ü', 'u', 3),
    ('ý', 'y', 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Whitespace,
    Punctuation,
    Digit,
    Letter,
}

#[derive(Debug, Clone, Copy)]
struct CollationElement {
    primary: (CharClass, u32),
    secondary: u8,
    tertiary: u8,
}

fn alphabet_weight(letter: &str) -> Option<u32> {
    ALPHABET.iter().position(|l| *l == letter).map(|p| p as u32)
}

fn element_for(ch: char) -> CollationElement {
    let tertiary = u8::from(ch.is_uppercase());

    if ch.is_whitespace() {
        return CollationElement {
            primary: (CharClass::Whitespace, ch as u32),
            secondary: 0,
            tertiary: 0,
        };
    }
    if let Some(digit) = ch.to_digit(10) {
        return CollationElement {
            primary: (CharClass::Digit, digit),
            secondary: 0,
            tertiary: 0,
        };
    }
    if !ch.is_alphabetic() {
        return CollationElement {
            primary: (CharClass::Punctuation, ch as u32),
            secondary: 0,
            tertiary: 0,
        };
    }

    let lower = ch.to_lowercase().next().unwrap_or(ch);
    let (base, secondary) = SECONDARY_ACCENTS
        .iter()
        .find(|(accented, _, _)| *accented == lower)
        .map(|(_, base, weight)| (*base, *weight))
        .unwrap_or((lower, 0));

    // 非捷克字母排在 ž 之后，按码位
    let weight = alphabet_weight(base.encode_utf8(&mut [0; 4]))
        .unwrap_or(ALPHABET.len() as u32 + base as u32);

    CollationElement {
        primary: (CharClass::Letter, weight),
        secondary,
        tertiary,
    }
}

fn collation_elements(value: &str) -> Vec<CollationElement> {
    let mut elements = Vec::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if matches!(ch, 'c' | 'C') && matches!(chars.peek(), Some('h' | 'H')) {
            chars.next();
            elements.push(CollationElement {
                primary: (CharClass::Letter, alphabet_weight("ch").unwrap_or(0)),
                secondary: 0,
                tertiary: u8::from(ch.is_uppercase()),
            });
            continue;
        }
        elements.push(element_for(ch));
    }

    elements
}

/// 按捷克语规则比较两个字符串
///
/// 三级都相同时按码位兜底，保证全序
pub fn czech_cmp(a: &str, b: &str) -> Ordering {
    let left = collation_elements(a);
    let right = collation_elements(b);

    let primary = left
        .iter()
        .map(|e| e.primary)
        .cmp(right.iter().map(|e| e.primary));
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = left
        .iter()
        .map(|e| e.secondary)
        .cmp(right.iter().map(|e| e.secondary));
    if secondary != Ordering::Equal {
        return secondary;
    }

    let tertiary = left
        .iter()
        .map(|e| e.tertiary)
        .cmp(right.iter().map(|e| e.tertiary));
    if tertiary != Ordering::Equal {
        return tertiary;
    }

    a.cmp(b)
}

/// 原地排序
pub fn sort_czech(values: &mut [String]) {
    values.sort_by(|a, b| czech_cmp(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut values: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        sort_czech(&mut values);
        values
    }

    #[test]
    fn test_feeder_numbers() {
        assert_eq!(sorted(&["F15", "F02", "F01"]), vec!["F01", "F02", "F15"]);
    }

    #[test]
    fn test_ch_sorts_after_h() {
        assert_eq!(
            sorted(&["ivan", "chata", "hrad"]),
            vec!["hrad", "chata", "ivan"]
        );
    }

    #[test]
    fn test_caron_letters_are_primary() {
        assert_eq!(
            sorted(&["dům", "čas", "cesta"]),
            vec!["cesta", "čas", "dům"]
        );
        assert_eq!(sorted(&["šum", "sud", "tam"]), vec!["sud", "šum", "tam"]);
        assert_eq!(sorted(&["řeka", "rak", "sob"]), vec!["rak", "řeka", "sob"]);
    }

    #[test]
    fn test_acute_accent_is_secondary() {
        assert_eq!(sorted(&["b", "áb", "ab"]), vec!["ab", "áb", "b"]);
        assert_eq!(sorted(&["ab", "áa"]), vec!["áa", "ab"]);
    }

    #[test]
    fn test_lowercase_before_uppercase() {
        assert_eq!(sorted(&["A1", "a1"]), vec!["a1", "A1"]);
        assert_eq!(czech_cmp("Ch", "ch"), Ordering::Greater);
    }

    #[test]
    fn test_digits_before_letters_and_punctuation_first() {
        assert_eq!(sorted(&["a", "1", "-"]), vec!["-", "1", "a"]);
        assert_eq!(sorted(&["A-2", "A 2"]), vec!["A 2", "A-2"]);
    }

    #[test]
    fn test_foreign_accents_sort_with_base_letter() {
        assert_eq!(sorted(&["žluť", "pes", "öl", "ol"]), vec!["ol", "öl", "pes", "žluť"]);
        assert_eq!(sorted(&["v", "ü", "u"]), vec!["u", "ü", "v"]);
    }
}
