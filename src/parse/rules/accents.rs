//! 正文模式下的重音字母与连字指令

use phf::phf_map;

/// 键为 "指令字符 + 字母"
static ACCENTS: phf::Map<&'static str, char> = phf_map! {
    "\"a" => 'ä', "\"e" => 'ë', "\"i" => 'ï', "\"o" => 'ö', "\"u" => 'ü', "\"y" => 'ÿ',
    "\"A" => 'Ä', "\"E" => 'Ë', "\"I" => 'Ï', "\"O" => 'Ö', "\"U" => 'Ü', "\"Y" => 'Ÿ',
    "'a" => 'á', "'e" => 'é', "'i" => 'í', "'o" => 'ó', "'u" => 'ú', "'y" => 'ý',
    "'A" => 'Á', "'E" => 'É', "'I" => 'Í', "'O" => 'Ó', "'U" => 'Ú', "'Y" => 'Ý',
    "'c" => 'ć', "'n" => 'ń', "'s" => 'ś', "'z" => 'ź',
    "'C" => 'Ć', "'N" => 'Ń', "'S" => 'Ś', "'Z" => 'Ź',
    "`a" => 'à', "`e" => 'è', "`i" => 'ì', "`o" => 'ò', "`u" => 'ù',
    "`A" => 'À', "`E" => 'È', "`I" => 'Ì', "`O" => 'Ò', "`U" => 'Ù',
    "^a" => 'â', "^e" => 'ê', "^i" => 'î', "^o" => 'ô', "^u" => 'û',
    "^A" => 'Â', "^E" => 'Ê', "^I" => 'Î', "^O" => 'Ô', "^U" => 'Û',
    "~a" => 'ã', "~n" => 'ñ', "~o" => 'õ',
    "~A" => 'Ã', "~N" => 'Ñ', "~O" => 'Õ',
    "=a" => 'ā', "=e" => 'ē', "=i" => 'ī', "=o" => 'ō', "=u" => 'ū',
    "=A" => 'Ā', "=E" => 'Ē', "=I" => 'Ī', "=O" => 'Ō', "=U" => 'Ū',
    ".z" => 'ż', ".Z" => 'Ż', ".e" => 'ė', ".E" => 'Ė', ".g" => 'ġ', ".G" => 'Ġ', ".I" => 'İ',
    "vc" => 'č', "vs" => 'š', "vz" => 'ž', "vr" => 'ř', "vn" => 'ň', "ve" => 'ě', "vd" => 'ď',
    "vC" => 'Č', "vS" => 'Š', "vZ" => 'Ž', "vR" => 'Ř', "vN" => 'Ň', "vE" => 'Ě', "vD" => 'Ď',
    "ua" => 'ă', "ug" => 'ğ', "uA" => 'Ă', "uG" => 'Ğ',
    "ra" => 'å', "ru" => 'ů', "rA" => 'Å', "rU" => 'Ů',
    "cc" => 'ç', "cs" => 'ş', "cC" => 'Ç', "cS" => 'Ş',
    "Ho" => 'ő', "Hu" => 'ű', "HO" => 'Ő', "HU" => 'Ű',
    "ka" => 'ą', "ke" => 'ę', "kA" => 'Ą', "kE" => 'Ę',
};

static LIGATURES: phf::Map<&'static str, &'static str> = phf_map! {
    "ss" => "ß",
    "ae" => "æ",
    "AE" => "Æ",
    "oe" => "œ",
    "OE" => "Œ",
    "o" => "ø",
    "O" => "Ø",
    "aa" => "å",
    "AA" => "Å",
    "l" => "ł",
    "L" => "Ł",
};

pub fn is_accent_command(cmd: char) -> bool {
    matches!(
        cmd,
        '"' | '\'' | '`' | '^' | '~' | '=' | '.' | 'v' | 'u' | 'r' | 'c' | 'H' | 'k'
    )
}

pub fn accented(cmd: char, letter: char) -> Option<char> {
    let mut key = String::with_capacity(2);
    key.push(cmd);
    key.push(letter);
    ACCENTS.get(key.as_str()).copied()
}

pub fn ligature(name: &str) -> Option<&'static str> {
    LIGATURES.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_lookup() {
        assert_eq!(accented('"', 'u'), Some('ü'));
        assert_eq!(accented('v', 'S'), Some('Š'));
        assert_eq!(accented('"', 'x'), None);
        assert_eq!(ligature("ss"), Some("ß"));
        assert!(!is_accent_command('x'));
    }
}
