//! 初始化模块：一次性发现系统字体，得到不可变的 `FontDefaults`

use fontdue::{Font, FontSettings}; // 引入 fontdue 中的字体类型与配置
use once_cell::sync::Lazy; // 引入 Lazy，确保字体只会发现一次
use std::env;
use std::sync::Arc;
use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight, ID}; // 引入字体数据库，供 usvg/resvg 使用

use crate::environment::{FontEncoding, FontRole};
use crate::error::RenderError; // 引入项目内自定义的错误类型

/// 已加载的字体面，`id` 作为度量缓存的键
pub struct LoadedFace {
    pub id: usize,
    pub font: Font,
}

/// 某个字体角色解析后的结果
pub struct RoleFonts {
    pub family: String,
    pub encoding: FontEncoding,
    /// 依次为 常规、粗体、斜体、粗斜体
    variants: [Option<Arc<LoadedFace>>; 4],
}

impl RoleFonts {
    fn unresolved(family: &str) -> Self {
        Self {
            family: family.to_string(),
            encoding: FontEncoding::Standard,
            variants: [None, None, None, None],
        }
    }

    fn face(&self, bold: bool, italic: bool) -> Option<&LoadedFace> {
        let idx = (bold as usize) | ((italic as usize) << 1);
        self.variants[idx]
            .as_deref()
            .or_else(|| self.variants[0].as_deref())
    }
}

/// 进程级别的字体默认值，计算一次后只读
pub struct FontDefaults {
    database: Database,
    roles: Vec<RoleFonts>,
}

static FONT_DEFAULTS: Lazy<Result<Arc<FontDefaults>, RenderError>> =
    Lazy::new(|| FontDefaults::discover().map(Arc::new));

/// 每个角色依次尝试的字体族
fn candidates(role: FontRole) -> (&'static [&'static str], Family<'static>, Option<&'static str>) {
    match role {
        FontRole::Roman => (
            &["Latin Modern Roman", "CMU Serif", "DejaVu Serif", "Liberation Serif", "Times New Roman"],
            Family::Serif,
            Some("MATHTEXT_FONT_ROMAN"),
        ),
        FontRole::Sans => (
            &["Latin Modern Sans", "CMU Sans Serif", "DejaVu Sans", "Liberation Sans", "Arial"],
            Family::SansSerif,
            Some("MATHTEXT_FONT_SANS"),
        ),
        FontRole::MathRoman => (
            &["Latin Modern Math", "STIX Two Math", "XITS Math", "Cambria Math", "DejaVu Serif"],
            Family::Serif,
            Some("MATHTEXT_FONT_MATH"),
        ),
        FontRole::MathSans => (
            &["DejaVu Sans", "Liberation Sans", "Arial"],
            Family::SansSerif,
            None,
        ),
        FontRole::Typewriter => (
            &["Latin Modern Mono", "DejaVu Sans Mono", "Liberation Mono", "Courier New"],
            Family::Monospace,
            Some("MATHTEXT_FONT_TYPEWRITER"),
        ),
        FontRole::Script | FontRole::Caligraphic => (
            &["URW Chancery L", "Z003", "Apple Chancery", "Comic Sans MS"],
            Family::Cursive,
            None,
        ),
        FontRole::Blackboard => (
            &["Latin Modern Math", "STIX Two Math", "DejaVu Sans"],
            Family::Serif,
            None,
        ),
        FontRole::Fraktur => (
            &["UnifrakturMaguntia", "Old English Text MT", "Latin Modern Math"],
            Family::Fantasy,
            None,
        ),
    }
}

/// 没有任何字体时写进 SVG 的字体族
fn generic_family(role: FontRole) -> &'static str {
    match role {
        FontRole::Sans | FontRole::MathSans => "sans-serif",
        FontRole::Typewriter => "monospace",
        FontRole::Script | FontRole::Caligraphic => "cursive",
        _ => "serif",
    }
}

impl FontDefaults {
    /// 进程内共享的默认值，首次调用时加载系统字体
    pub fn global() -> Result<Arc<FontDefaults>, RenderError> {
        match &*FONT_DEFAULTS {
            Ok(defaults) => Ok(Arc::clone(defaults)),
            Err(err) => Err(err.clone()),
        }
    }

    /// 扫描系统字体并逐个角色解析
    pub fn discover() -> Result<Self, RenderError> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    /// 用给定的字体数据库解析各个角色
    pub fn from_database(database: Database) -> Result<Self, RenderError> {
        let mut loaded: Vec<(ID, Arc<LoadedFace>)> = Vec::new();
        let mut roles = Vec::with_capacity(FontRole::ALL.len());
        for role in FontRole::ALL {
            let resolved = resolve_role(&database, role, &mut loaded)?;
            match resolved.variants[0] {
                Some(_) => log::info!("字体角色 {:?} 使用 '{}'", role, resolved.family),
                None => log::warn!("字体角色 {:?} 没有找到可用字体，将使用近似度量", role),
            }
            roles.push(resolved);
        }
        Ok(Self { database, roles })
    }

    pub fn has_faces(&self) -> bool {
        self.roles.iter().any(|role| role.variants[0].is_some())
    }

    pub fn family(&self, role: FontRole) -> &str {
        &self.roles[role.index()].family
    }

    pub fn encoding(&self, role: FontRole) -> FontEncoding {
        self.roles[role.index()].encoding
    }

    pub fn face(&self, role: FontRole, bold: bool, italic: bool) -> Option<&LoadedFace> {
        self.roles[role.index()].face(bold, italic)
    }

    /// 按 `FontRole::ALL` 的顺序给出字体族，供 SVG 输出使用
    pub fn family_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.family.clone()).collect()
    }

    /// 提供给 usvg/resvg 使用的字体数据库
    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// 没有系统字体时使用的通用字体族
pub fn generic_family_names() -> Vec<String> {
    FontRole::ALL
        .iter()
        .map(|role| generic_family(*role).to_string())
        .collect()
}

fn resolve_role(
    db: &Database,
    role: FontRole,
    loaded: &mut Vec<(ID, Arc<LoadedFace>)>,
) -> Result<RoleFonts, RenderError> {
    let (names, generic, env_key) = candidates(role);
    let override_name = env_key.and_then(|key| env::var(key).ok());
    let mut families: Vec<Family<'_>> = Vec::with_capacity(names.len() + 2);
    if let Some(name) = override_name.as_deref() {
        families.push(Family::Name(name));
    }
    families.extend(names.iter().map(|name| Family::Name(*name)));
    families.push(generic);

    for family in &families {
        let Some(regular) = query_face(db, family, Weight::NORMAL, Style::Normal) else {
            continue;
        };
        let regular = load_face(db, regular, loaded)?;
        let mut variants = [Some(Arc::clone(&regular)), None, None, None];
        let styles = [
            (1, Weight::BOLD, Style::Normal),
            (2, Weight::NORMAL, Style::Italic),
            (3, Weight::BOLD, Style::Italic),
        ];
        for (slot, weight, style) in styles {
            if let Some(id) = query_face(db, family, weight, style) {
                variants[slot] = Some(load_face(db, id, loaded)?);
            }
        }
        return Ok(RoleFonts {
            family: db.family_name(family).to_string(),
            encoding: detect_encoding(&regular.font),
            variants,
        });
    }
    Ok(RoleFonts::unresolved(generic_family(role)))
}

fn query_face(db: &Database, family: &Family<'_>, weight: Weight, style: Style) -> Option<ID> {
    db.query(&Query {
        families: std::slice::from_ref(family),
        weight,
        stretch: Stretch::Normal,
        style,
    })
}

fn load_face(
    db: &Database,
    id: ID,
    loaded: &mut Vec<(ID, Arc<LoadedFace>)>,
) -> Result<Arc<LoadedFace>, RenderError> {
    if let Some((_, face)) = loaded.iter().find(|(known, _)| *known == id) {
        return Ok(Arc::clone(face));
    }
    let font = db
        .with_face_data(id, |data, index| {
            Font::from_bytes(
                data,
                FontSettings {
                    collection_index: index,
                    ..FontSettings::default()
                },
            )
        })
        .ok_or_else(|| RenderError::FontLoadError("字体数据库中找不到字体面".into()))?
        .map_err(|err| RenderError::FontLoadError(format!("无法解析字体: {err}")))?;
    let face = Arc::new(LoadedFace {
        id: loaded.len(),
        font,
    });
    loaded.push((id, Arc::clone(&face)));
    Ok(face)
}

fn detect_encoding(font: &Font) -> FontEncoding {
    let has = |ch| font.lookup_glyph_index(ch) != 0;
    match (has('α'), has('∑')) {
        (true, true) => FontEncoding::Unicode,
        (true, false) => FontEncoding::UnicodeLimited,
        _ => FontEncoding::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_resolves_to_generic_families() {
        let defaults = FontDefaults::from_database(Database::new()).expect("空数据库也应成功");
        assert!(!defaults.has_faces());
        assert_eq!(defaults.family(FontRole::Typewriter), "monospace");
        assert_eq!(defaults.encoding(FontRole::Roman), FontEncoding::Standard);
        assert!(defaults.face(FontRole::Roman, true, true).is_none());
        assert_eq!(defaults.family_names().len(), FontRole::ALL.len());
    }
}
