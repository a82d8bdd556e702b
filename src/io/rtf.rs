//! Plain text out of RTF markup.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static RTF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\\([a-z]{1,32})(-?\d{1,10})?[ ]?|\\'([0-9a-f]{2})|\\([^a-z])|([{}])|[\r\n]+|(.)",
    )
    .expect("valid pattern")
});

/// Control words that open a destination whose content is not body text.
const DESTINATIONS: &[&str] = &[
    "aftncn", "aftnsep", "aftnsepc", "annotation", "atnauthor", "atndate", "atnicn", "atnid",
    "atnparent", "atnref", "atntime", "atrfend", "atrfstart", "author", "background",
    "bkmkend", "bkmkstart", "blipuid", "buptim", "category", "colorschememapping", "colortbl",
    "comment", "company", "creatim", "datafield", "datastore", "defchp", "defpap", "do",
    "doccomm", "docvar", "dptxbxtext", "ebcend", "ebcstart", "factoidname", "falt", "fchars",
    "ffdeftext", "ffentrymcr", "ffexitmcr", "ffformat", "ffhelptext", "ffl", "ffname",
    "ffstattext", "field", "file", "filetbl", "fldinst", "fldrslt", "fldtype", "fname",
    "fontemb", "fontfile", "fonttbl", "footer", "footerf", "footerl", "footerr", "footnote",
    "formfield", "ftncn", "ftnsep", "ftnsepc", "g", "generator", "gridtbl", "header", "headerf",
    "headerl", "headerr", "hl", "hlfr", "hlinkbase", "hlloc", "hlsrc", "hsv", "htmltag", "info",
    "keycode", "keywords", "latentstyles", "lchars", "levelnumbers", "leveltext", "lfolevel",
    "linkval", "list", "listlevel", "listname", "listoverride", "listoverridetable",
    "listpicture", "liststylename", "listtable", "listtext", "lsdlockedexcept", "macc",
    "maccpr", "mailmerge", "maln", "malnscr", "manager", "margpr", "mbar", "mbarpr", "mbasejc",
    "mbegchr", "mborderbox", "mborderboxpr", "mbox", "mboxpr", "mchr", "mcount", "mctrlpr",
    "md", "mdeg", "mdeghide", "mden", "mdiff", "mdpr", "me", "mendchr", "meqarr", "meqarrpr",
    "mf", "mfname", "mfpr", "mfunc", "mfuncpr", "mgroupchr", "mgroupchrpr", "mgrow",
    "mhidebot", "mhideleft", "mhideright", "mhidetop", "mhtmltag", "mlim", "mlimloc",
    "mlimlow", "mlimlowpr", "mlimupp", "mlimupppr", "mm", "mmaddfieldname", "mmath",
    "mmathpict", "mmathpr", "mmaxdist", "mmc", "mmcjc", "mmconnectstr", "mmconnectstrdata",
    "mmcpr", "mmcs", "mmdatasource", "mmheadersource", "mmmailsubject", "mmodso",
    "mmodsofilter", "mmodsofldmpdata", "mmodsomappedname", "mmodsoname", "mmodsorecipdata",
    "mmodsosort", "mmodsosrc", "mmodsotable", "mmodsoudl", "mmodsoudldata", "mmodsouniquetag",
    "mmpr", "mmquery", "mmr", "mnary", "mnarypr", "mnobreak", "mnum", "mobjdist", "momath",
    "momathpara", "momathparapr", "mopemu", "mphant", "mphantpr", "mplchide", "mpos", "mr",
    "mrad", "mradpr", "mrpr", "msepchr", "mshow", "mshp", "mspre", "msprepr", "mssub",
    "mssubpr", "mssubsup", "mssubsuppr", "mssup", "mssuppr", "mstrikebltr", "mstrikeh",
    "mstriketlbr", "mstrikev", "msub", "msubhide", "msup", "msuphide", "mtransp", "mtype",
    "mvertjc", "mvfmf", "mvfml", "mvtof", "mvtol", "mzeroasc", "mzerodesc", "mzerowid",
    "nesttableprops", "nextfile", "nonesttables", "objalias", "objclass", "objdata", "object",
    "objname", "objsect", "objtime", "oldcprops", "oldpprops", "oldsprops", "oldtprops",
    "oleclsid", "operator", "panose", "password", "passwordhash", "pgp", "pgptbl", "picprop",
    "pict", "pn", "pnseclvl", "pntext", "pntxta", "pntxtb", "printim", "private", "propname",
    "protend", "protstart", "protusertbl", "pxe", "result", "revtbl", "revtim", "rsidtbl",
    "rxe", "shp", "shpgrp", "shpinst", "shppict", "shprslt", "shptxt", "sn", "sp", "staticval",
    "stylesheet", "subject", "sv", "svb", "tc", "template", "themedata", "title", "txe", "ud",
    "upr", "userprops", "wgrffmtfilter", "windowcaption", "writereservation",
    "writereservhash", "xe", "xform", "xmlattrname", "xmlattrvalue", "xmlclose", "xmlname",
    "xmlnstbl", "xmlopen",
];

static DESTINATION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DESTINATIONS.iter().copied().collect());

fn special_char(word: &str) -> Option<&'static str> {
    Some(match word {
        "par" | "line" => "\n",
        "sect" | "page" => "\n\n",
        "tab" => "\t",
        "emdash" => "\u{2014}",
        "endash" => "\u{2013}",
        "emspace" => "\u{2003}",
        "enspace" => "\u{2002}",
        "qmspace" => "\u{2005}",
        "bullet" => "\u{2022}",
        "lquote" => "\u{2018}",
        "rquote" => "\u{2019}",
        "ldblquote" => "\u{201C}",
        "rdblquote" => "\u{201D}",
        _ => return None,
    })
}

/// Remove RTF markup from `text`, keeping the body text.
///
/// Groups push and pop the "ignorable" state; `\'hh` escapes are read as
/// Latin-1; `\uN` emits the code point and skips the next `\ucN` fallback
/// characters.
///
/// # Examples
///
/// ```
/// use contexto::io::strip_rtf;
///
/// let rtf = r"{\rtf1\ansi{\fonttbl\f0 Arial;}\f0 Canci\'f3n \b nueva\b0\par}";
/// assert_eq!(strip_rtf(rtf), "Canción nueva\n");
/// ```
pub fn strip_rtf(text: &str) -> String {
    let mut stack: Vec<(usize, bool)> = Vec::new();
    let mut ignorable = false;
    let mut ucskip = 1usize;
    let mut curskip = 0usize;
    let mut out = String::with_capacity(text.len());

    for caps in RTF_PATTERN.captures_iter(text) {
        if let Some(brace) = caps.get(5) {
            curskip = 0;
            if brace.as_str() == "{" {
                stack.push((ucskip, ignorable));
            } else if let Some((skip, ign)) = stack.pop() {
                ucskip = skip;
                ignorable = ign;
            }
        } else if let Some(symbol) = caps.get(4) {
            curskip = 0;
            match symbol.as_str() {
                "~" if !ignorable => out.push('\u{A0}'),
                "{" | "}" | "\\" if !ignorable => out.push_str(symbol.as_str()),
                "*" => ignorable = true,
                _ => {}
            }
        } else if let Some(word) = caps.get(1) {
            curskip = 0;
            let word = word.as_str().to_lowercase();
            let arg = caps.get(2).and_then(|a| a.as_str().parse::<i64>().ok());
            if DESTINATION_SET.contains(word.as_str()) {
                ignorable = true;
            } else if ignorable {
                continue;
            } else if let Some(special) = special_char(&word) {
                out.push_str(special);
            } else if word == "uc" {
                ucskip = arg.and_then(|a| usize::try_from(a).ok()).unwrap_or(1);
            } else if word == "u"
                && let Some(mut code) = arg
            {
                if code < 0 {
                    code += 0x10000;
                }
                if let Some(c) = u32::try_from(code).ok().and_then(char::from_u32) {
                    out.push(c);
                }
                curskip = ucskip;
            }
        } else if let Some(hex) = caps.get(3) {
            if curskip > 0 {
                curskip -= 1;
            } else if !ignorable && let Ok(byte) = u8::from_str_radix(hex.as_str(), 16) {
                out.push(char::from(byte));
            }
        } else if let Some(literal) = caps.get(6) {
            if curskip > 0 {
                curskip -= 1;
            } else if !ignorable {
                out.push_str(literal.as_str());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_body() {
        let rtf = r"{\rtf1\ansi\deff0{\fonttbl{\f0 Times;}}{\colortbl;\red0\green0\blue0;}
\pard Hola mundo.\par
Segunda l\'ednea\tab fin\par}";
        assert_eq!(strip_rtf(rtf), "Hola mundo.\nSegunda línea\tfin\n");
    }

    #[test]
    fn test_unicode_and_skip() {
        assert_eq!(strip_rtf(r"{\uc1 ni\u241?o}"), "niño");
        assert_eq!(strip_rtf(r"{\uc0\u8364 5}"), "€5");
    }

    #[test]
    fn test_ignorable_and_escapes() {
        assert_eq!(strip_rtf(r"{\*\generator Writer;}texto"), "texto");
        assert_eq!(strip_rtf(r"a\{b\}\\c\~d"), "a{b}\\c\u{A0}d");
        assert_eq!(strip_rtf(r"\ldblquote cita\rdblquote  \emdash"), "\u{201C}cita\u{201D} \u{2014}");
    }
}
