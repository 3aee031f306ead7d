use crate::domain::{DsfError, DsfResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub name: &'static str,
    pub default: f64,
    pub description: &'static str,
}

impl ParameterDeclaration {
    pub const fn new(name: &'static str, default: f64, description: &'static str) -> Self {
        Self {
            name,
            default,
            description,
        }
    }
}

/// Free (fitted) parameters of a function, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    declarations: Vec<ParameterDeclaration>,
    values: Vec<f64>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, declaration: ParameterDeclaration) -> DsfResult<()> {
        if self.index_of(declaration.name).is_some() {
            return Err(DsfError::internal(
                "SYS.PARAMETER_REDECLARED",
                format!("parameter '{}' is already declared", declaration.name),
            ));
        }
        self.values.push(declaration.default);
        self.declarations.push(declaration);
        Ok(())
    }

    pub fn declarations(&self) -> &[ParameterDeclaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> DsfResult<f64> {
        self.index_of(name)
            .map(|index| self.values[index])
            .ok_or_else(|| unknown_parameter(name))
    }

    pub fn set(&mut self, name: &str, value: f64) -> DsfResult<()> {
        let index = self.index_of(name).ok_or_else(|| unknown_parameter(name))?;
        self.values[index] = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.declarations
            .iter()
            .zip(&self.values)
            .map(|(declaration, value)| (declaration.name, *value))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.declarations
            .iter()
            .position(|declaration| declaration.name == name)
    }
}

fn unknown_parameter(name: &str) -> DsfError {
    DsfError::input_validation(
        "INPUT.UNKNOWN_PARAMETER",
        format!("function has no parameter named '{name}'"),
    )
}
