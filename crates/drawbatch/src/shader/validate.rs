use naga::ShaderStage;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::ShaderSource;

/// Parses and validates the WGSL of `source`.
///
/// Returns the diagnostic text on failure, formatted against the source so it
/// reads like a compiler log. Both entry points must exist with the right stage.
pub fn validate_wgsl(source: &ShaderSource) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(source.wgsl)
        .map_err(|err| err.emit_to_string(source.wgsl))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| err.emit_to_string(source.wgsl))?;

    for (entry, stage) in [
        (source.vertex_entry, ShaderStage::Vertex),
        (source.fragment_entry, ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry && ep.stage == stage);
        if !found {
            return Err(format!(
                "shader `{}`: missing {stage:?} entry point `{entry}`",
                source.name
            ));
        }
    }

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::SPRITE_SHADER;
    use naga::{BinaryOperator, Block, Expression, Function, Handle, Literal, Statement};

    fn entry<'m>(module: &'m naga::Module, name: &str) -> &'m Function {
        &module
            .entry_points
            .iter()
            .find(|ep| ep.name == name)
            .unwrap_or_else(|| panic!("no entry point {name}"))
            .function
    }

    fn count_kills(block: &Block) -> usize {
        block
            .iter()
            .map(|stmt| match stmt {
                Statement::Kill => 1,
                Statement::Block(inner) => count_kills(inner),
                Statement::If { accept, reject, .. } => count_kills(accept) + count_kills(reject),
                Statement::Loop {
                    body, continuing, ..
                } => count_kills(body) + count_kills(continuing),
                Statement::Switch { cases, .. } => cases.iter().map(|c| count_kills(&c.body)).sum(),
                _ => 0,
            })
            .sum()
    }

    /// Looks through loads and splats to the value underneath.
    fn strip(func: &Function, mut expr: Handle<Expression>) -> Handle<Expression> {
        loop {
            match func.expressions[expr] {
                Expression::Load { pointer } => expr = pointer,
                Expression::Splat { value, .. } => expr = value,
                _ => return expr,
            }
        }
    }

    fn is_float(func: &Function, expr: Handle<Expression>, want: f64) -> bool {
        match &func.expressions[strip(func, expr)] {
            Expression::Literal(Literal::F32(v)) => f64::from(*v) == want,
            Expression::Literal(Literal::AbstractFloat(v)) => *v == want,
            Expression::Compose { components, .. } => {
                components.iter().all(|&c| is_float(func, c, want))
            }
            _ => false,
        }
    }

    fn binaries(func: &Function, wanted: BinaryOperator) -> Vec<(Handle<Expression>, Handle<Expression>)> {
        func.expressions
            .iter()
            .filter_map(|(_, expr)| match *expr {
                Expression::Binary { op, left, right } if op == wanted => Some((left, right)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fragment_discards_twice() {
        let module = validate_wgsl(&SPRITE_SHADER).unwrap();
        assert_eq!(count_kills(&entry(&module, "fs_main").body), 2);
        assert_eq!(count_kills(&entry(&module, "vs_main").body), 0);
    }

    #[test]
    fn fragment_divides_by_alpha() {
        let module = validate_wgsl(&SPRITE_SHADER).unwrap();
        let fs = entry(&module, "fs_main");

        let by_alpha = binaries(fs, BinaryOperator::Divide).into_iter().any(|(_, right)| {
            matches!(fs.expressions[strip(fs, right)], Expression::AccessIndex { index: 3, .. })
        });
        assert!(by_alpha, "fs_main does not un-premultiply by alpha");
    }

    #[test]
    fn vertex_remaps_offset_to_signed_range() {
        let module = validate_wgsl(&SPRITE_SHADER).unwrap();
        let vs = entry(&module, "vs_main");

        let remap = binaries(vs, BinaryOperator::Multiply).into_iter().any(|(left, right)| {
            let centered = match vs.expressions[left] {
                Expression::Binary {
                    op: BinaryOperator::Subtract,
                    right: half,
                    ..
                } => is_float(vs, half, 0.5),
                _ => false,
            };
            centered && is_float(vs, right, 2.0)
        });
        assert!(remap, "vs_main does not compute (offset - 0.5) * 2");
    }

    #[test]
    fn sprite_shader_validates() {
        let module = validate_wgsl(&SPRITE_SHADER).expect("sprite.wgsl should validate");
        assert_eq!(module.entry_points.len(), 2);
    }

    #[test]
    fn syntax_error_reports_log() {
        let broken = ShaderSource {
            name: "broken",
            wgsl: "@vertex fn vs_main( -> @builtin(position) vec4<f32> { }",
            ..SPRITE_SHADER
        };
        let log = validate_wgsl(&broken).unwrap_err();
        assert!(!log.is_empty());
    }

    #[test]
    fn missing_entry_point() {
        let source = ShaderSource {
            name: "renamed",
            fragment_entry: "fs_other",
            ..SPRITE_SHADER
        };
        let log = validate_wgsl(&source).unwrap_err();
        assert!(log.contains("fs_other"), "{log}");
    }
}
