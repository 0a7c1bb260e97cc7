use pysecure_core::PromptVariant;

/// Files the generated project must contain, in the order they are requested.
pub fn required_files(variant: PromptVariant) -> &'static [(&'static str, &'static str)] {
    match variant {
        PromptVariant::Minimal => &[
            ("main.py", "Ponto de entrada."),
            ("auth.py", "Lógica de autenticação e validações."),
            ("database.py", "Persistência (mockada)."),
            ("gui.py", "Definição da interface visual com Flet."),
        ],
        PromptVariant::Hardened => &[
            ("main.py", "Ponto de entrada."),
            ("auth.py", "Lógica de autenticação e validações."),
            ("security.py", "Hashing de senha de via única (SHA-256 com salt, hashlib)."),
            ("database.py", "Persistência (mockada), armazenando apenas hashes."),
            ("gui.py", "Definição da interface visual com Flet."),
        ],
    }
}

fn node_types(variant: PromptVariant) -> &'static str {
    match variant {
        PromptVariant::Minimal => "file|logic|ui",
        PromptVariant::Hardened => "file|logic|ui|security",
    }
}

/// Build the single fixed instruction sent to the model.
pub fn instruction(variant: PromptVariant) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(
        "Crie um sistema de login completo em Python modularizado com interface gráfica (GUI).\n\
Requisitos:\n\
- O usuário deve poder logar usando Nome, CPF ou E-mail em um único campo inteligente ou campos separados.\n\
- Use a biblioteca 'flet' para a interface gráfica (é moderna e baseada em Flutter).\n\
- O código deve ser profissional, com tratamento de erros e validações (regex para email, algoritmo de CPF).\n",
    );

    if variant == PromptVariant::Hardened {
        out.push_str(
            "- Senhas NUNCA podem ser armazenadas em texto puro: use hashing de via única \
(hashlib.sha256 com salt aleatório por usuário) e compare hashes em tempo constante.\n\
- Isole toda a criptografia em uma camada de segurança dedicada.\n",
        );
    }

    out.push_str("- Arquivos obrigatórios:\n");
    for (i, (name, purpose)) in required_files(variant).iter().enumerate() {
        out.push_str(&format!("    {}. {}: {}\n", i + 1, name, purpose));
    }

    out.push_str(
        "- Gere uma documentação técnica detalhada em Markdown.\n\
- Forneça a estrutura de um mapa mental relacionando os arquivos e o fluxo da UI.\n",
    );
    if variant == PromptVariant::Hardened {
        out.push_str(
            "- O mapa mental deve conter um nó do tipo \"security\" representando a camada de \
segurança (hashing), ligado aos módulos que o utilizam.\n",
        );
    }

    out.push_str(&format!(
        "\nResponda EXCLUSIVAMENTE em formato JSON seguindo este esquema:\n\
{{\n\
  \"files\": [\n\
    {{\"name\": \"string\", \"content\": \"string\", \"description\": \"string\"}}\n\
  ],\n\
  \"documentation\": \"string (markdown content)\",\n\
  \"mentalMap\": {{\n\
    \"nodes\": [{{\"id\": \"string\", \"label\": \"string\", \"type\": \"{}\"}}],\n\
    \"links\": [{{\"source\": \"string\", \"target\": \"string\"}}]\n\
  }}\n\
}}\n",
        node_types(variant)
    ));

    out
}
